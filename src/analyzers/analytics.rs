// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::extracted::ExtractedData;
use crate::domain::models::pillar::{PillarName, PillarResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

/// 分析工具支柱分析器
///
/// 用固定签名目录对HTML与外部脚本做正则匹配，盘点站点安装的
/// 追踪/营销工具，再对四个类别分别打分：追踪广度、转化追踪
/// 成熟度、追踪负载的性能影响、围绕追踪的隐私合规信号。
/// 总分取四类平均。
pub struct AnalyticsAnalyzer;

/// 工具类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolCategory {
    Analytics,
    TagManager,
    Conversion,
    Heatmap,
    Marketing,
}

struct ToolSignature {
    name: &'static str,
    category: ToolCategory,
    pattern: Regex,
    /// 估算脚本负载（KB）
    payload_kb: u32,
}

static TOOL_CATALOGUE: Lazy<Vec<ToolSignature>> = Lazy::new(|| {
    let sig = |name, category, pattern: &str, payload_kb| ToolSignature {
        name,
        category,
        pattern: Regex::new(pattern).expect("invalid tool signature"),
        payload_kb,
    };
    vec![
        sig("Google Analytics 4", ToolCategory::Analytics, r"gtag\(|googletagmanager\.com/gtag", 28),
        sig("Universal Analytics", ToolCategory::Analytics, r"google-analytics\.com/analytics\.js|ga\('create'", 17),
        sig("Google Tag Manager", ToolCategory::TagManager, r"googletagmanager\.com/gtm\.js|GTM-[A-Z0-9]+", 28),
        sig("Facebook Pixel", ToolCategory::Conversion, r"connect\.facebook\.net|fbq\(", 25),
        sig("Google Ads", ToolCategory::Conversion, r"googleadservices\.com|AW-\d{9,}", 20),
        sig("LinkedIn Insight", ToolCategory::Conversion, r"snap\.licdn\.com|_linkedin_partner_id", 12),
        sig("TikTok Pixel", ToolCategory::Conversion, r"analytics\.tiktok\.com|ttq\.load", 30),
        sig("Hotjar", ToolCategory::Heatmap, r"static\.hotjar\.com|hj\('", 32),
        sig("Microsoft Clarity", ToolCategory::Heatmap, r"clarity\.ms|clarity\(", 15),
        sig("Mixpanel", ToolCategory::Analytics, r"cdn\.mxpnl\.com|mixpanel\.init", 24),
        sig("Amplitude", ToolCategory::Analytics, r"cdn\.amplitude\.com|amplitude\.getInstance", 22),
        sig("Segment", ToolCategory::TagManager, r"cdn\.segment\.com|analytics\.load", 18),
        sig("Plausible", ToolCategory::Analytics, r"plausible\.io/js", 1),
        sig("Matomo", ToolCategory::Analytics, r"matomo\.js|_paq\.push", 20),
        sig("HubSpot", ToolCategory::Marketing, r"js\.hs-scripts\.com|_hsq\.push", 35),
        sig("Intercom", ToolCategory::Marketing, r"widget\.intercom\.io|Intercom\(", 40),
    ]
});

impl AnalyticsAnalyzer {
    /// 分析站点的追踪工具配置
    pub fn analyze(data: &ExtractedData) -> PillarResult {
        let mut haystack = data.html.clone();
        for script in &data.scripts {
            haystack.push('\n');
            haystack.push_str(script);
        }

        let detected: Vec<&ToolSignature> = TOOL_CATALOGUE
            .iter()
            .filter(|tool| tool.pattern.is_match(&haystack))
            .collect();

        let mut recommendations = Vec::new();

        let tracking_score = score_tracking_breadth(&detected, &mut recommendations);
        let conversion_score = score_conversion(&detected, &mut recommendations);
        let performance_score = score_performance_impact(&detected, data, &mut recommendations);
        let privacy_score = score_privacy_signals(&detected, &haystack, &mut recommendations);

        let score = (tracking_score + conversion_score + performance_score + privacy_score) / 4;

        let tool_names: Vec<&str> = detected.iter().map(|t| t.name).collect();
        let insights = if tool_names.is_empty() {
            "No analytics or tracking tools detected".to_string()
        } else {
            format!("Detected tools: {}", tool_names.join(", "))
        };

        PillarResult {
            pillar: PillarName::Analytics,
            score,
            analyzed: true,
            insights,
            recommendations,
            raw: json!({
                "tools": tool_names,
                "tracking_score": tracking_score,
                "conversion_score": conversion_score,
                "performance_score": performance_score,
                "privacy_score": privacy_score,
            }),
            error: None,
        }
    }
}

/// 追踪广度：至少要有一个分析工具
fn score_tracking_breadth(detected: &[&ToolSignature], recommendations: &mut Vec<String>) -> u32 {
    let analytics_count = detected
        .iter()
        .filter(|t| matches!(t.category, ToolCategory::Analytics | ToolCategory::TagManager))
        .count() as u32;
    match analytics_count {
        0 => {
            recommendations
                .push("Install a web analytics tool to understand visitor behavior".to_string());
            40
        }
        1 => 85,
        _ => 100,
    }
}

/// 转化追踪成熟度
fn score_conversion(detected: &[&ToolSignature], recommendations: &mut Vec<String>) -> u32 {
    let conversion_count = detected
        .iter()
        .filter(|t| t.category == ToolCategory::Conversion)
        .count() as u32;
    if conversion_count == 0 {
        if !detected.is_empty() {
            recommendations
                .push("Add conversion tracking to measure campaign effectiveness".to_string());
        }
        60
    } else {
        (80 + conversion_count * 10).min(100)
    }
}

/// 追踪负载的性能影响
///
/// 负载按签名目录中的估算KB求和；同步加载的追踪脚本额外扣分。
fn score_performance_impact(
    detected: &[&ToolSignature],
    data: &ExtractedData,
    recommendations: &mut Vec<String>,
) -> u32 {
    let mut score = 100u32;
    let payload_kb: u32 = detected.iter().map(|t| t.payload_kb).sum();
    if payload_kb > 50 {
        score = score.saturating_sub(30);
        recommendations.push(format!(
            "Reduce tracking payload (~{}KB); consider a server-side tag manager",
            payload_kb
        ));
    } else if payload_kb > 20 {
        score = score.saturating_sub(15);
    }

    let sync_tracking = count_sync_tracking_scripts(&data.html);
    if sync_tracking > 0 {
        score = score.saturating_sub(10);
        recommendations.push("Load tracking scripts with async or defer".to_string());
    }

    score
}

/// 围绕追踪的隐私合规信号
fn score_privacy_signals(
    detected: &[&ToolSignature],
    haystack: &str,
    recommendations: &mut Vec<String>,
) -> u32 {
    if detected.is_empty() {
        return 100;
    }
    let lower = haystack.to_lowercase();
    let consent_signal = lower.contains("consent") || lower.contains("cookie");
    let anonymized = lower.contains("anonymize_ip") || lower.contains("consent_mode");
    match (consent_signal, anonymized) {
        (true, true) => 100,
        (true, false) => 85,
        _ => {
            recommendations
                .push("Gate tracking scripts behind user consent".to_string());
            50
        }
    }
}

static SYNC_TRACKING_SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script[^>]*src="[^"]*(googletagmanager|google-analytics|connect\.facebook|hotjar|segment|mixpanel)[^"]*"[^>]*>"#)
        .expect("invalid sync tracking regex")
});

fn count_sync_tracking_scripts(html: &str) -> usize {
    SYNC_TRACKING_SCRIPT_RE
        .find_iter(html)
        .filter(|m| {
            let tag = m.as_str().to_lowercase();
            !tag.contains("async") && !tag.contains("defer")
        })
        .count()
}
