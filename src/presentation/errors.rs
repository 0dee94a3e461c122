// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::request_repository::RepositoryError;
use crate::utils::validators::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// HTTP层错误类型
///
/// 所有处理器共享的错误出口，统一渲染为 `{success:false, error}`。
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求参数校验失败
    #[error("{0}")]
    Validation(String),
    /// 邮箱已存在先前的审计请求
    #[error("An analysis request already exists for this email address")]
    DuplicateEmail,
    /// 请求不存在
    #[error("Analysis request not found")]
    NotFound,
    /// 请求状态不允许该操作
    #[error("Request is not in a processable state")]
    Conflict,
    /// 内部错误
    #[error("Internal server error")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound,
            RepositoryError::Conflict => AppError::Conflict,
            RepositoryError::Database(db) => AppError::Internal(db.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("bad url".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateEmail.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let error = AppError::Internal("connection refused at 10.0.0.3".to_string());
        assert_eq!(error.to_string(), "Internal server error");
    }
}
