// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::metadata::AnalysisMetadata;
use crate::domain::repositories::request_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 分析元数据仓库特质
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// 创建元数据行（提交时调用，每个请求一行）
    async fn create(&self, metadata: &AnalysisMetadata) -> Result<(), RepositoryError>;
    /// 根据请求ID查找元数据
    async fn find_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<AnalysisMetadata>, RepositoryError>;
    /// 写入提取快照（提取完成后调用）
    async fn set_extracted(
        &self,
        request_id: Uuid,
        extracted: serde_json::Value,
    ) -> Result<(), RepositoryError>;
    /// 写入聚合结果（聚合完成后调用）
    async fn set_aggregate(
        &self,
        request_id: Uuid,
        overall_score: u32,
        duration_ms: i64,
    ) -> Result<(), RepositoryError>;
}
