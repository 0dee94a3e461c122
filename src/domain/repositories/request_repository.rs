// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::request::{AnalysisRequest, RequestStatus};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 状态转换冲突（如重复触发处理）
    #[error("Conflicting state transition")]
    Conflict,
}

/// 分析请求仓库特质
///
/// 定义分析请求数据访问接口
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// 创建新请求
    async fn create(&self, request: &AnalysisRequest) -> Result<AnalysisRequest, RepositoryError>;
    /// 根据ID查找请求
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AnalysisRequest>, RepositoryError>;
    /// 根据邮箱查找请求（邮箱已小写化）
    async fn find_by_email(&self, email: &str)
        -> Result<Option<AnalysisRequest>, RepositoryError>;
    /// 原子地将请求从 Pending 转换为 Processing
    ///
    /// 请求不处于 Pending 状态时返回 `Conflict`，防止同一请求被重复处理。
    async fn mark_processing(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 标记请求已完成
    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 标记请求已失败并记录错误信息
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), RepositoryError>;
}
