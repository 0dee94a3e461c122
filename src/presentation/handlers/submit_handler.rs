// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::metadata::AnalysisMetadata;
use crate::domain::models::request::{AnalysisRequest, RequestStatus};
use crate::domain::repositories::metadata_repository::MetadataRepository;
use crate::domain::repositories::request_repository::RequestRepository;
use crate::domain::repositories::result_repository::ResultRepository;
use crate::presentation::errors::AppError;
use crate::utils::{url_utils, validators};
use crate::workers::audit_worker::AuditWorker;

/// 提交请求体
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    /// 待审计的网站URL
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
    /// 接收报告的邮箱
    #[validate(email)]
    pub email: String,
}

/// 提交一次网站审计
///
/// 校验URL与邮箱（拒绝一次性邮箱域名），规范化URL，拒绝已有
/// 历史请求的邮箱，落库 pending 请求与元数据行，然后以
/// fire-and-forget 方式调度流水线。响应在调度后立即返回，
/// 调用方通过状态查询接口轮询进度。
pub async fn submit<R, S, M>(
    Extension(requests): Extension<Arc<R>>,
    Extension(metadata): Extension<Arc<M>>,
    Extension(worker): Extension<Arc<AuditWorker<R, S, M>>>,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: RequestRepository + 'static,
    S: ResultRepository + 'static,
    M: MetadataRepository + 'static,
{
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validators::validate_url(&payload.url)?;
    let email = validators::validate_email(&payload.email)?;
    let url = url_utils::normalize_url(&payload.url)
        .map_err(|_| AppError::Validation("Invalid URL".to_string()))?;

    if requests.find_by_email(&email).await?.is_some() {
        warn!("Duplicate submission rejected for {}", email);
        return Err(AppError::DuplicateEmail);
    }

    let now = chrono::Utc::now().fixed_offset();
    let request = AnalysisRequest {
        id: Uuid::new_v4(),
        url: url.clone(),
        email,
        status: RequestStatus::Pending,
        error_message: None,
        created_at: now,
        completed_at: None,
        updated_at: now,
    };
    let request = requests.create(&request).await?;

    metadata
        .create(&AnalysisMetadata {
            request_id: request.id,
            extracted: None,
            overall_score: None,
            duration_ms: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    info!("Audit request {} created for {}", request.id, url);

    // Fire and forget: the pipeline outlives this handler and updates
    // persisted state as it goes
    let request_id = request.id;
    tokio::spawn(async move {
        if let Err(e) = worker.process(request_id).await {
            tracing::error!("Pipeline dispatch failed for {}: {}", request_id, e);
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "success": true,
            "request_id": request.id,
            "status": request.status.to_string(),
        })),
    ))
}
