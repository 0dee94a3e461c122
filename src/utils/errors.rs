// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 提取引擎错误类型
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// 浏览器启动或连接失败
    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),
    /// 导航失败（两阶段等待均超时或出错）
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),
    /// 页面内数据采集失败
    #[error("Page evaluation failed: {0}")]
    EvaluationFailed(String),
    /// 整体提取超时
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    RepositoryError(String),
    /// 提取错误
    #[error("Extraction error: {0}")]
    ExtractionError(String),
    /// 未找到
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<crate::domain::repositories::request_repository::RepositoryError> for WorkerError {
    fn from(e: crate::domain::repositories::request_repository::RepositoryError) -> Self {
        WorkerError::RepositoryError(e.to_string())
    }
}

impl From<ExtractionError> for WorkerError {
    fn from(e: ExtractionError) -> Self {
        WorkerError::ExtractionError(e.to_string())
    }
}
