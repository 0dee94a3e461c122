// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::pillar::PillarResult;
use crate::domain::repositories::request_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 支柱结果仓库特质
///
/// analysis_results 表是追加写入的：每条结果插入后不再修改。
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// 保存一条支柱结果
    async fn save(&self, request_id: Uuid, result: &PillarResult) -> Result<(), RepositoryError>;
    /// 查找某个请求的全部支柱结果（按创建时间排序）
    async fn find_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<PillarResult>, RepositoryError>;
}
