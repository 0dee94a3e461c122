// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::analyzers::apply_penalties;
use crate::domain::models::pillar::{PillarName, PillarResult};
use reqwest::header::HeaderMap;
use serde_json::json;
use std::time::Duration;

/// 安全支柱分析器
///
/// 对目标URL发起一次HEAD请求，审计六个安全响应头的存在性，
/// 外加非TLS源与服务端技术栈泄露的扣分。所有扣分从100累加，
/// 下限钳制为0。
pub struct SecurityAnalyzer {
    client: reqwest::Client,
}

/// 安全头与对应缺失扣分
const SECURITY_HEADERS: [(&str, u32, &str); 6] = [
    ("strict-transport-security", 15, "Enable HSTS to force HTTPS connections"),
    ("content-security-policy", 15, "Add a Content-Security-Policy header"),
    ("x-frame-options", 10, "Add X-Frame-Options to prevent clickjacking"),
    ("x-content-type-options", 10, "Add X-Content-Type-Options: nosniff"),
    ("x-xss-protection", 5, "Add an X-XSS-Protection header"),
    ("referrer-policy", 5, "Add a Referrer-Policy header"),
];

impl Default for SecurityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityAnalyzer {
    /// 创建新的安全分析器实例
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// 审计目标的安全响应头
    pub async fn analyze(&self, url: &str) -> PillarResult {
        let response = match self
            .client
            .head(url)
            .timeout(Duration::from_secs(15))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Security HEAD request failed for {}: {}", url, e);
                return PillarResult::failed(
                    PillarName::Security,
                    format!("Could not reach the site for a header audit: {}", e),
                );
            }
        };

        let headers = response.headers().clone();
        let final_url = response.url().clone();

        let mut penalties = 0u32;
        let mut recommendations = Vec::new();
        let mut missing = Vec::new();
        let mut present = Vec::new();

        for (name, penalty, recommendation) in SECURITY_HEADERS {
            if headers.contains_key(name) {
                present.push(name);
            } else {
                penalties += penalty;
                missing.push(name);
                recommendations.push(recommendation.to_string());
            }
        }

        let tls = final_url.scheme() == "https";
        if !tls {
            penalties += 20;
            recommendations.push("Serve the site over HTTPS".to_string());
        }

        let disclosures = technology_disclosures(&headers);
        penalties += 5 * disclosures.len() as u32;
        if !disclosures.is_empty() {
            recommendations.push(format!(
                "Remove technology-disclosing headers ({})",
                disclosures.join(", ")
            ));
        }

        let score = apply_penalties(penalties);

        let insights = if missing.is_empty() && tls && disclosures.is_empty() {
            "All audited security headers are present".to_string()
        } else {
            format!(
                "{} of {} security headers present{}",
                present.len(),
                SECURITY_HEADERS.len(),
                if tls { "" } else { "; site is not served over TLS" }
            )
        };

        PillarResult {
            pillar: PillarName::Security,
            score,
            analyzed: true,
            insights,
            recommendations,
            raw: json!({
                "https": tls,
                "present_headers": present,
                "missing_headers": missing,
                "disclosed_headers": disclosures,
            }),
            error: None,
        }
    }
}

/// 收集泄露服务端技术栈的响应头
fn technology_disclosures(headers: &HeaderMap) -> Vec<String> {
    let mut disclosed = Vec::new();
    for name in ["server", "x-powered-by"] {
        if let Some(value) = headers.get(name) {
            if let Ok(text) = value.to_str() {
                if !text.is_empty() {
                    disclosed.push(format!("{}: {}", name, text));
                }
            }
        }
    }
    disclosed
}
