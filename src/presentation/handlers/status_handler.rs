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
use axum::response::IntoResponse;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::pillar::{PillarName, PillarResult};
use crate::domain::models::request::RequestStatus;
use crate::domain::repositories::metadata_repository::MetadataRepository;
use crate::domain::repositories::request_repository::RequestRepository;
use crate::domain::repositories::result_repository::ResultRepository;
use crate::presentation::errors::AppError;

/// 单个支柱完成分析的估算耗时（秒），用于剩余时间估算
const ESTIMATED_SECS_PER_PILLAR: u64 = 25;

/// 状态查询响应
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub request_id: Uuid,
    pub url: String,
    pub status: String,
    /// 完成支柱数占7的百分比（四舍五入）
    pub progress: u32,
    pub pillars: BTreeMap<String, PillarView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time_remaining_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 支柱结果的对外视图
#[derive(Debug, Serialize)]
pub struct PillarView {
    pub score: u32,
    pub analyzed: bool,
    pub insights: String,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PillarResult> for PillarView {
    fn from(result: &PillarResult) -> Self {
        Self {
            score: result.score,
            analyzed: result.analyzed,
            insights: result.insights.clone(),
            recommendations: result.recommendations.clone(),
            error: result.error.clone(),
        }
    }
}

/// 查询审计请求的当前状态与进度
pub async fn get_status<R, S, M>(
    Extension(requests): Extension<Arc<R>>,
    Extension(results): Extension<Arc<S>>,
    Extension(metadata): Extension<Arc<M>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    R: RequestRepository,
    S: ResultRepository,
    M: MetadataRepository,
{
    let request = requests
        .find_by_id(request_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let pillar_results = results.find_by_request_id(request_id).await?;
    let overall_score = metadata
        .find_by_request_id(request_id)
        .await?
        .and_then(|m| m.overall_score);

    Ok(Json(build_status(&request.url, request_id, request.status, request.error_message, &pillar_results, overall_score)))
}

/// 由持久化状态组装响应（只读，不回写）
///
/// 顶层状态落后于支柱行时做读侧自动提升：7个支柱结果齐备即
/// 视为完成。
fn build_status(
    url: &str,
    request_id: Uuid,
    status: RequestStatus,
    error: Option<String>,
    pillar_results: &[PillarResult],
    overall_score: Option<u32>,
) -> StatusResponse {
    let done = pillar_results.len().min(PillarName::ALL.len());
    let progress = ((done * 100) as f64 / PillarName::ALL.len() as f64).round() as u32;

    let effective_status =
        if status == RequestStatus::Processing && done >= PillarName::ALL.len() {
            RequestStatus::Completed
        } else {
            status
        };

    let estimated_time_remaining_secs = match effective_status {
        RequestStatus::Pending | RequestStatus::Processing => {
            Some((PillarName::ALL.len() - done) as u64 * ESTIMATED_SECS_PER_PILLAR)
        }
        _ => None,
    };

    let pillars = pillar_results
        .iter()
        .map(|r| (r.pillar.to_string(), PillarView::from(r)))
        .collect();

    StatusResponse {
        request_id,
        url: url.to_string(),
        status: effective_status.to_string(),
        progress,
        pillars,
        overall_score,
        estimated_time_remaining_secs,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_for(pillar: PillarName) -> PillarResult {
        PillarResult {
            pillar,
            score: 80,
            analyzed: true,
            insights: String::new(),
            recommendations: Vec::new(),
            raw: serde_json::Value::Null,
            error: None,
        }
    }

    #[test]
    fn test_progress_rounding() {
        let results: Vec<PillarResult> = PillarName::ALL[..3].iter().map(|p| result_for(*p)).collect();
        let status = build_status(
            "https://example.org",
            Uuid::new_v4(),
            RequestStatus::Processing,
            None,
            &results,
            None,
        );
        // 3 of 7 pillars -> 42.857 rounds to 43
        assert_eq!(status.progress, 43);
        assert_eq!(status.estimated_time_remaining_secs, Some(100));
        assert_eq!(status.status, "processing");
    }

    #[test]
    fn test_auto_promotion_when_all_pillars_present() {
        let results: Vec<PillarResult> =
            PillarName::ALL.iter().map(|p| result_for(*p)).collect();
        let status = build_status(
            "https://example.org",
            Uuid::new_v4(),
            RequestStatus::Processing,
            None,
            &results,
            Some(80),
        );
        assert_eq!(status.status, "completed");
        assert_eq!(status.progress, 100);
        assert_eq!(status.estimated_time_remaining_secs, None);
    }

    #[test]
    fn test_failed_request_keeps_error() {
        let status = build_status(
            "https://example.org",
            Uuid::new_v4(),
            RequestStatus::Failed,
            Some("navigation failed".to_string()),
            &[],
            None,
        );
        assert_eq!(status.status, "failed");
        assert_eq!(status.error.as_deref(), Some("navigation failed"));
        assert_eq!(status.estimated_time_remaining_secs, None);
    }
}
