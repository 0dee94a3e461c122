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

use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::models::request::RequestStatus;
use crate::domain::repositories::metadata_repository::MetadataRepository;
use crate::domain::repositories::request_repository::RequestRepository;
use crate::domain::repositories::result_repository::ResultRepository;
use crate::presentation::errors::AppError;
use crate::workers::audit_worker::AuditWorker;

/// 手动触发一个pending请求的处理
///
/// 请求不存在返回404，不处于pending状态返回409。检查通过后
/// 立即调度流水线并返回，不等待分析完成；真正的
/// pending→processing 原子转换发生在工作器内部，并发触发时
/// 只有一个能赢。
pub async fn process<R, S, M>(
    Extension(requests): Extension<Arc<R>>,
    Extension(worker): Extension<Arc<AuditWorker<R, S, M>>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    R: RequestRepository + 'static,
    S: ResultRepository + 'static,
    M: MetadataRepository + 'static,
{
    let request = requests
        .find_by_id(request_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if request.status != RequestStatus::Pending {
        return Err(AppError::Conflict);
    }

    info!("Processing triggered for request {}", request_id);
    tokio::spawn(async move {
        if let Err(e) = worker.process(request_id).await {
            tracing::error!("Pipeline dispatch failed for {}: {}", request_id, e);
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "success": true,
            "request_id": request_id,
        })),
    ))
}
