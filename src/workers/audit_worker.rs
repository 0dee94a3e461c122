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

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::analyzers::analytics::AnalyticsAnalyzer;
use crate::analyzers::compliance::ComplianceAnalyzer;
use crate::analyzers::design;
use crate::analyzers::performance::PerformanceAnalyzer;
use crate::analyzers::responsiveness::ResponsivenessAnalyzer;
use crate::analyzers::security::SecurityAnalyzer;
use crate::analyzers::seo::SeoAnalyzer;
use crate::analyzers::vision::VisionService;
use crate::config::settings::Settings;
use crate::domain::models::extracted::ExtractedData;
use crate::domain::models::pillar::PillarResult;
use crate::domain::models::request::AnalysisRequest;
use crate::domain::models::vision::VisionAnalysis;
use crate::domain::repositories::metadata_repository::MetadataRepository;
use crate::domain::repositories::request_repository::RequestRepository;
use crate::domain::repositories::result_repository::ResultRepository;
use crate::domain::services::notification::EmailSender;
use crate::domain::services::report;
use crate::engines::extractor::{ExtractOptions, Extractor};
use crate::utils::errors::WorkerError;

/// 审计工作器
///
/// 驱动单个请求的完整分析流水线：提取 → 视觉分析 → 七个支柱
/// 依次执行 → 聚合 → 通知。每个支柱结果在下一个支柱开始前落库，
/// 崩溃后已完成的支柱不丢失。流水线内任何未捕获错误都会把请求
/// 置为失败并发送失败通知；浏览器资源在成功与失败路径上都会释放。
pub struct AuditWorker<R, S, M>
where
    R: RequestRepository,
    S: ResultRepository,
    M: MetadataRepository,
{
    requests: Arc<R>,
    results: Arc<S>,
    metadata: Arc<M>,
    extractor: Arc<dyn Extractor>,
    mailer: Arc<dyn EmailSender>,
    settings: Settings,
}

impl<R, S, M> AuditWorker<R, S, M>
where
    R: RequestRepository,
    S: ResultRepository,
    M: MetadataRepository,
{
    /// 创建新的审计工作器实例
    pub fn new(
        requests: Arc<R>,
        results: Arc<S>,
        metadata: Arc<M>,
        extractor: Arc<dyn Extractor>,
        mailer: Arc<dyn EmailSender>,
        settings: Settings,
    ) -> Self {
        Self {
            requests,
            results,
            metadata,
            extractor,
            mailer,
            settings,
        }
    }

    /// 处理一个已提交的请求
    ///
    /// 先原子地完成 pending→processing 转换（重复触发返回冲突），
    /// 再执行流水线。流水线失败时写入失败状态并发送失败邮件；
    /// 两类结局都会返回 `Ok`，只有前置校验失败才返回 `Err`。
    #[instrument(skip(self), fields(request_id = %request_id))]
    pub async fn process(&self, request_id: Uuid) -> Result<(), WorkerError> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| WorkerError::NotFound(format!("request {}", request_id)))?;

        self.requests.mark_processing(request_id).await?;
        info!("Analysis started for {}", request.url);

        let started = Instant::now();
        match self.run_pipeline(&request, started).await {
            Ok(overall_score) => {
                let duration_ms = started.elapsed().as_millis() as i64;
                info!(
                    "Analysis completed for {} in {}ms (overall {})",
                    request.url, duration_ms, overall_score
                );
                Ok(())
            }
            Err(e) => {
                error!("Analysis failed for {}: {}", request.url, e);
                if let Err(persist_err) =
                    self.requests.mark_failed(request_id, &e.to_string()).await
                {
                    error!("Failed to persist failure state: {}", persist_err);
                }
                let message = report::render_failure_report(&request.url, &e.to_string());
                self.mailer.send(&request.email, &message).await;
                Ok(())
            }
        }
    }

    /// 执行完整分析流水线，返回聚合得分
    async fn run_pipeline(
        &self,
        request: &AnalysisRequest,
        started: Instant,
    ) -> Result<u32, WorkerError> {
        let extracted = self.extract(&request.url).await?;

        if let Err(e) = self
            .metadata
            .set_extracted(request.id, extracted.summary())
            .await
        {
            warn!("Failed to persist extraction snapshot: {}", e);
        }

        let vision = self.analyze_vision(&extracted).await;
        let results = self.run_pillars(request, &extracted, &vision).await?;

        let overall_score = aggregate_score(&results);
        self.metadata
            .set_aggregate(
                request.id,
                overall_score,
                started.elapsed().as_millis() as i64,
            )
            .await
            .map_err(WorkerError::from)?;

        self.requests.mark_completed(request.id).await?;

        let message = report::render_completion_report(&request.url, &results);
        self.mailer.send(&request.email, &message).await;

        Ok(overall_score)
    }

    /// 提取阶段
    async fn extract(&self, url: &str) -> Result<ExtractedData, WorkerError> {
        let options = ExtractOptions {
            full_page_screenshot: self.settings.extraction.full_page_screenshot,
            ..Default::default()
        };
        Ok(self.extractor.extract(url, &options).await?)
    }

    /// 视觉分析阶段（软失败，无截图时直接降级）
    async fn analyze_vision(&self, extracted: &ExtractedData) -> VisionAnalysis {
        match &extracted.screenshot {
            Some(screenshot) => {
                VisionService::new(&self.settings.vision)
                    .analyze_combined(screenshot, &extracted.url)
                    .await
            }
            None => {
                warn!("No screenshot captured, vision analysis degraded");
                VisionAnalysis::degraded()
            }
        }
    }

    /// 按固定顺序执行七个支柱，逐个落库
    async fn run_pillars(
        &self,
        request: &AnalysisRequest,
        extracted: &ExtractedData,
        vision: &VisionAnalysis,
    ) -> Result<Vec<PillarResult>, WorkerError> {
        let mut results = Vec::with_capacity(7);

        let performance = PerformanceAnalyzer::new(&self.settings.pagespeed)
            .analyze(&request.url, Some(extracted))
            .await;
        let cls = performance.raw["core_web_vitals"]["cls"].as_f64();
        self.persist(request.id, performance, &mut results).await?;

        let design = design::analyze(extracted, vision, cls);
        self.persist(request.id, design, &mut results).await?;

        let responsiveness = ResponsivenessAnalyzer::new(self.settings.extraction.clone())
            .analyze(&request.url, vision)
            .await;
        self.persist(request.id, responsiveness, &mut results).await?;

        let seo = SeoAnalyzer::new().analyze(extracted).await;
        self.persist(request.id, seo, &mut results).await?;

        let security = SecurityAnalyzer::new().analyze(&request.url).await;
        self.persist(request.id, security, &mut results).await?;

        let compliance = ComplianceAnalyzer::analyze(extracted, vision);
        self.persist(request.id, compliance, &mut results).await?;

        let analytics = AnalyticsAnalyzer::analyze(extracted);
        self.persist(request.id, analytics, &mut results).await?;

        Ok(results)
    }

    async fn persist(
        &self,
        request_id: Uuid,
        result: PillarResult,
        results: &mut Vec<PillarResult>,
    ) -> Result<(), WorkerError> {
        info!(
            "Pillar {} scored {} (analyzed: {})",
            result.pillar, result.score, result.analyzed
        );
        self.results.save(request_id, &result).await?;
        results.push(result);
        Ok(())
    }
}

/// 聚合得分：只对成功分析的支柱取平均
///
/// 全部支柱都软失败时聚合得分为0。
pub fn aggregate_score(results: &[PillarResult]) -> u32 {
    let analyzed: Vec<u32> = results
        .iter()
        .filter(|r| r.analyzed)
        .map(|r| r.score)
        .collect();
    if analyzed.is_empty() {
        return 0;
    }
    analyzed.iter().sum::<u32>() / analyzed.len() as u32
}
