// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::analyzers::apply_penalties;
use crate::config::settings::PageSpeedSettings;
use crate::domain::models::extracted::ExtractedData;
use crate::domain::models::pillar::{PillarName, PillarResult};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// 性能支柱分析器
///
/// 优先调用外部页面速度审计API（desktop与mobile两种策略并发
/// 执行后汇合）；API密钥缺失、超时或出错时回退到基于提取快照
/// 的本地启发式评分，从不向调用方抛错。
pub struct PerformanceAnalyzer {
    settings: PageSpeedSettings,
    client: reqwest::Client,
}

impl PerformanceAnalyzer {
    /// 创建新的性能分析器实例
    pub fn new(settings: &PageSpeedSettings) -> Self {
        Self {
            settings: settings.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// 分析页面性能
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `extracted` - 提取快照；API不可用且快照也缺失时产生软失败
    pub async fn analyze(&self, url: &str, extracted: Option<&ExtractedData>) -> PillarResult {
        if self.settings.api_key.is_some() {
            match self.analyze_via_api(url).await {
                Ok(result) => return result,
                Err(e) => {
                    tracing::warn!("PageSpeed API failed for {}: {}, using fallback", url, e);
                }
            }
        } else {
            tracing::debug!("PageSpeed API key not configured, using fallback for {}", url);
        }

        match extracted {
            Some(data) => heuristic_score(data),
            None => PillarResult::failed(
                PillarName::Performance,
                "Speed audit API unavailable and no extracted data for heuristic scoring",
            ),
        }
    }

    async fn analyze_via_api(&self, url: &str) -> Result<PillarResult> {
        let (desktop, mobile) = tokio::join!(
            self.fetch_strategy(url, "desktop"),
            self.fetch_strategy(url, "mobile")
        );
        let desktop = desktop.context("desktop strategy failed")?;
        let mobile = mobile.context("mobile strategy failed")?;

        Ok(combine_strategies(&desktop, &mobile))
    }

    /// 拉取单个策略的审计结果，带硬超时
    async fn fetch_strategy(&self, url: &str, strategy: &str) -> Result<Value> {
        let api_key = self
            .settings
            .api_key
            .as_ref()
            .context("API key not configured")?;

        let request = self
            .client
            .get(&self.settings.base_url)
            .query(&[
                ("url", url),
                ("strategy", strategy),
                ("key", api_key.as_str()),
                ("category", "performance"),
                ("category", "accessibility"),
                ("category", "best-practices"),
                ("category", "seo"),
            ])
            .timeout(Duration::from_secs(self.settings.timeout_secs));

        let response = request
            .send()
            .await
            .with_context(|| format!("request failed for strategy {}", strategy))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "speed audit API returned {} for strategy {}",
                response.status(),
                strategy
            );
        }

        response
            .json::<Value>()
            .await
            .context("failed to decode speed audit response")
    }
}

/// 单条优化机会
#[derive(Debug, Clone)]
struct Opportunity {
    id: String,
    title: String,
    /// Lighthouse子得分，越低代表优先级越高
    score: f64,
}

/// 合并两种策略的审计结果
///
/// 四个类别得分取两策略平均；Core Web Vitals取自mobile结果
/// （更接近真实用户的测量）；优化机会合并后按影响分升序排列，
/// mobile来源的条目优先。
fn combine_strategies(desktop: &Value, mobile: &Value) -> PillarResult {
    let categories = ["performance", "accessibility", "best-practices", "seo"];
    let mut category_scores = BTreeMap::new();
    for category in categories {
        let d = category_score(desktop, category);
        let m = category_score(mobile, category);
        let combined = match (d, m) {
            (Some(d), Some(m)) => (d + m) / 2.0,
            (Some(v), None) | (None, Some(v)) => v,
            (None, None) => 0.0,
        };
        category_scores.insert(category, (combined * 100.0).round() as u32);
    }

    let score = (category_scores.values().sum::<u32>() as f64 / categories.len() as f64).round()
        as u32;

    let lcp_ms = audit_numeric(mobile, "largest-contentful-paint").unwrap_or(0.0);
    let fid_ms = audit_numeric(mobile, "max-potential-fid").unwrap_or(0.0);
    let cls = audit_numeric(mobile, "cumulative-layout-shift").unwrap_or(0.0);

    let opportunities = merge_opportunities(desktop, mobile);
    let recommendations: Vec<String> = opportunities
        .iter()
        .take(5)
        .map(|o| o.title.clone())
        .collect();

    let insights = format!(
        "Lighthouse category averages across desktop and mobile: performance {}, accessibility {}, best practices {}, SEO {}. \
         Mobile Core Web Vitals: LCP {:.0}ms, FID {:.0}ms, CLS {:.3}.",
        category_scores["performance"],
        category_scores["accessibility"],
        category_scores["best-practices"],
        category_scores["seo"],
        lcp_ms,
        fid_ms,
        cls
    );

    PillarResult {
        pillar: PillarName::Performance,
        score: score.min(100),
        analyzed: true,
        insights,
        recommendations,
        raw: json!({
            "source": "speed_audit_api",
            "categories": category_scores,
            "core_web_vitals": { "lcp_ms": lcp_ms, "fid_ms": fid_ms, "cls": cls },
            "opportunities": opportunities
                .iter()
                .map(|o| json!({ "id": o.id, "title": o.title, "score": o.score }))
                .collect::<Vec<_>>(),
        }),
        error: None,
    }
}

fn category_score(report: &Value, category: &str) -> Option<f64> {
    report["lighthouseResult"]["categories"][category]["score"].as_f64()
}

fn audit_numeric(report: &Value, audit: &str) -> Option<f64> {
    report["lighthouseResult"]["audits"][audit]["numericValue"].as_f64()
}

/// 合并desktop与mobile的优化机会，mobile来源优先，按子得分升序
fn merge_opportunities(desktop: &Value, mobile: &Value) -> Vec<Opportunity> {
    let mut merged: BTreeMap<String, Opportunity> = BTreeMap::new();
    for report in [desktop, mobile] {
        if let Some(audits) = report["lighthouseResult"]["audits"].as_object() {
            for (id, audit) in audits {
                if audit["details"]["type"].as_str() != Some("opportunity") {
                    continue;
                }
                let opportunity = Opportunity {
                    id: id.clone(),
                    title: audit["title"].as_str().unwrap_or(id).to_string(),
                    score: audit["score"].as_f64().unwrap_or(1.0),
                };
                // iteration order puts mobile last, overwriting desktop entries
                merged.insert(id.clone(), opportunity);
            }
        }
    }

    let mut opportunities: Vec<Opportunity> = merged.into_values().collect();
    opportunities.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
    opportunities
}

/// 本地启发式评分
///
/// 由原始加载时间与资源数量推出一个粗粒度分数。
fn heuristic_score(data: &ExtractedData) -> PillarResult {
    let mut penalties = 0u32;
    let mut recommendations = Vec::new();

    let load_ms = data.timings.load_time_ms;
    if load_ms > 5000 {
        penalties += 30;
        recommendations.push("Reduce page load time, it currently exceeds 5 seconds".to_string());
    } else if load_ms > 3000 {
        penalties += 20;
        recommendations.push("Reduce page load time below 3 seconds".to_string());
    } else if load_ms > 1500 {
        penalties += 10;
    }

    let script_count = data.scripts.len();
    if script_count > 25 {
        penalties += 15;
        recommendations.push("Cut down the number of external scripts".to_string());
    } else if script_count > 12 {
        penalties += 8;
        recommendations.push("Consider bundling external scripts".to_string());
    }

    let stylesheet_count = data.stylesheets.len();
    if stylesheet_count > 10 {
        penalties += 5;
        recommendations.push("Consolidate stylesheets".to_string());
    }

    let image_count = data.images.len();
    if image_count > 50 {
        penalties += 10;
        recommendations.push("Lazy-load below-the-fold images".to_string());
    } else if image_count > 25 {
        penalties += 5;
    }

    let score = apply_penalties(penalties);
    let insights = format!(
        "Heuristic scoring (speed audit API unavailable): load time {}ms, {} scripts, {} stylesheets, {} images.",
        load_ms, script_count, stylesheet_count, image_count
    );

    PillarResult {
        pillar: PillarName::Performance,
        score,
        analyzed: true,
        insights,
        recommendations,
        raw: json!({
            "source": "heuristic",
            "load_time_ms": load_ms,
            "script_count": script_count,
            "stylesheet_count": stylesheet_count,
            "image_count": image_count,
        }),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::extracted::PerformanceTimings;

    fn report(perf: f64, lcp: f64) -> Value {
        json!({
            "lighthouseResult": {
                "categories": {
                    "performance": { "score": perf },
                    "accessibility": { "score": 0.9 },
                    "best-practices": { "score": 0.8 },
                    "seo": { "score": 1.0 }
                },
                "audits": {
                    "largest-contentful-paint": { "numericValue": lcp },
                    "max-potential-fid": { "numericValue": 120.0 },
                    "cumulative-layout-shift": { "numericValue": 0.05 },
                    "render-blocking-resources": {
                        "title": "Eliminate render-blocking resources",
                        "score": 0.3,
                        "details": { "type": "opportunity" }
                    }
                }
            }
        })
    }

    #[test]
    fn test_combine_averages_categories() {
        let result = combine_strategies(&report(1.0, 1800.0), &report(0.5, 2400.0));
        assert!(result.analyzed);
        // performance 75, accessibility 90, best-practices 80, seo 100 -> 86
        assert_eq!(result.score, 86);
        // CWV come from the mobile report
        assert_eq!(result.raw["core_web_vitals"]["lcp_ms"], 2400.0);
    }

    #[test]
    fn test_opportunities_sorted_by_impact() {
        let mut desktop = report(0.9, 1800.0);
        desktop["lighthouseResult"]["audits"]["unused-css-rules"] = json!({
            "title": "Reduce unused CSS",
            "score": 0.8,
            "details": { "type": "opportunity" }
        });
        let mobile = report(0.9, 2000.0);
        let opportunities = merge_opportunities(&desktop, &mobile);
        assert_eq!(opportunities.len(), 2);
        assert_eq!(opportunities[0].id, "render-blocking-resources");
        assert!(opportunities[0].score <= opportunities[1].score);
    }

    #[test]
    fn test_heuristic_penalizes_slow_heavy_pages() {
        let mut data = ExtractedData {
            timings: PerformanceTimings {
                load_time_ms: 6200,
                ..Default::default()
            },
            ..Default::default()
        };
        data.scripts = (0..30).map(|i| format!("https://cdn.example.com/{}.js", i)).collect();

        let result = heuristic_score(&data);
        assert!(result.analyzed);
        assert_eq!(result.score, 100 - 30 - 15);
        assert!(!result.recommendations.is_empty());
    }

    #[test]
    fn test_heuristic_fast_light_page_keeps_high_score() {
        let data = ExtractedData {
            timings: PerformanceTimings {
                load_time_ms: 900,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = heuristic_score(&data);
        assert_eq!(result.score, 100);
    }
}
