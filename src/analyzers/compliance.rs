// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::extracted::ExtractedData;
use crate::domain::models::pillar::{PillarName, PillarResult};
use crate::domain::models::vision::VisionAnalysis;
use serde_json::json;

/// 合规支柱分析器
///
/// 基于规则检测Cookie同意横幅、隐私政策与服务条款链接、基础
/// 无障碍审计以及GDPR就绪度启发式。四个类别分数（无障碍/隐私/
/// 法律/Cookie）取平均为总分。当提供视觉分析结果时，视觉分数
/// 只会抬高文本分数（取两者较大值），绝不拉低。
pub struct ComplianceAnalyzer;

const COOKIE_KEYWORDS: [&str; 4] = ["cookie", "cookies", "tracking", "隐私"];
const CONSENT_KEYWORDS: [&str; 6] = ["accept", "consent", "agree", "akzeptieren", "accepter", "同意"];
const CONSENT_VENDORS: [&str; 5] = ["onetrust", "cookiebot", "didomi", "usercentrics", "quantcast"];
const GDPR_KEYWORDS: [&str; 5] = [
    "gdpr",
    "data protection",
    "legitimate interest",
    "right to erasure",
    "dsgvo",
];

/// WCAG符合级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WcagLevel {
    Aa,
    A,
    Fail,
}

impl WcagLevel {
    fn from_accessibility_score(score: u32) -> Self {
        match score {
            80..=u32::MAX => WcagLevel::Aa,
            60..=79 => WcagLevel::A,
            _ => WcagLevel::Fail,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            WcagLevel::Aa => "AA",
            WcagLevel::A => "A",
            WcagLevel::Fail => "Fail",
        }
    }
}

impl ComplianceAnalyzer {
    /// 分析页面合规性
    pub fn analyze(data: &ExtractedData, vision: &VisionAnalysis) -> PillarResult {
        let html_lower = data.html.to_lowercase();

        let mut recommendations = Vec::new();

        let banner = has_consent_banner(&html_lower)
            || (vision.available && vision.compliance.cookie_banner_detected);
        let privacy = has_privacy_policy(data, &html_lower)
            || (vision.available && vision.compliance.privacy_link_detected);
        let terms = has_terms(data, &html_lower);

        // Cookies
        let cookie_score = if data.cookies.is_empty() {
            100
        } else if banner {
            100
        } else {
            recommendations.push(
                "Show a cookie-consent banner before setting non-essential cookies".to_string(),
            );
            35
        };

        // Privacy
        let privacy_score = if privacy {
            100
        } else {
            recommendations.push("Link to a privacy policy from every page".to_string());
            30
        };

        // Legal
        let legal_score = if terms {
            100
        } else {
            recommendations.push("Publish terms of service".to_string());
            50
        };

        // Accessibility
        let (accessibility_score, mut a11y_recs) = accessibility_audit(data, &html_lower);
        recommendations.append(&mut a11y_recs);

        let wcag = WcagLevel::from_accessibility_score(accessibility_score);

        let gdpr_ready =
            banner && privacy && GDPR_KEYWORDS.iter().any(|k| html_lower.contains(k));
        if !gdpr_ready && !data.cookies.is_empty() {
            recommendations.push(
                "Document the legal basis for data processing to support GDPR compliance"
                    .to_string(),
            );
        }

        let text_score =
            (accessibility_score + privacy_score + legal_score + cookie_score) / 4;

        // Vision can only raise the score, never lower it
        let score = if vision.available && vision.compliance.confidence > 0.0 {
            text_score.max(vision.compliance.score)
        } else {
            text_score
        };
        if vision.available {
            merge_recommendations(&mut recommendations, &vision.compliance.recommendations);
        }

        PillarResult {
            pillar: PillarName::Compliance,
            score,
            analyzed: true,
            insights: format!(
                "WCAG {}; consent banner {}; privacy policy {}; terms {}",
                wcag.as_str(),
                presence(banner),
                presence(privacy),
                presence(terms)
            ),
            recommendations,
            raw: json!({
                "accessibility_score": accessibility_score,
                "privacy_score": privacy_score,
                "legal_score": legal_score,
                "cookie_score": cookie_score,
                "wcag_level": wcag.as_str(),
                "cookie_banner": banner,
                "gdpr_ready": gdpr_ready,
            }),
            error: None,
        }
    }
}

fn presence(found: bool) -> &'static str {
    if found {
        "found"
    } else {
        "missing"
    }
}

/// Cookie同意横幅检测
///
/// 已知供应商框架直接命中；否则要求Cookie关键词与同意/按钮
/// 关键词在页面中同时出现。
fn has_consent_banner(html_lower: &str) -> bool {
    if CONSENT_VENDORS.iter().any(|v| html_lower.contains(v)) {
        return true;
    }
    COOKIE_KEYWORDS.iter().any(|k| html_lower.contains(k))
        && CONSENT_KEYWORDS.iter().any(|k| html_lower.contains(k))
}

fn has_privacy_policy(data: &ExtractedData, html_lower: &str) -> bool {
    data.links.iter().any(|l| {
        let text = l.text.to_lowercase();
        let href = l.href.to_lowercase();
        text.contains("privacy") || href.contains("privacy") || href.contains("datenschutz")
    }) || html_lower.contains("privacy policy")
}

fn has_terms(data: &ExtractedData, html_lower: &str) -> bool {
    data.links.iter().any(|l| {
        let text = l.text.to_lowercase();
        let href = l.href.to_lowercase();
        text.contains("terms") || href.contains("terms") || href.contains("conditions")
    }) || html_lower.contains("terms of service")
}

/// 基础无障碍审计
fn accessibility_audit(data: &ExtractedData, html_lower: &str) -> (u32, Vec<String>) {
    let mut score = 100u32;
    let mut recommendations = Vec::new();

    if !data.images.is_empty() {
        let with_alt = data
            .images
            .iter()
            .filter(|i| i.alt.as_deref().is_some_and(|a| !a.is_empty()))
            .count();
        let coverage = with_alt as f64 / data.images.len() as f64;
        if coverage < 0.5 {
            score = score.saturating_sub(30);
            recommendations.push("Add alternative text to images".to_string());
        } else if coverage < 0.9 {
            score = score.saturating_sub(15);
            recommendations.push("Complete alternative text for remaining images".to_string());
        }
    }

    if data.headings.is_empty() {
        score = score.saturating_sub(20);
        recommendations.push("Structure the page with headings".to_string());
    } else {
        let h1_count = data.headings.iter().filter(|h| h.level == 1).count();
        if h1_count != 1 {
            score = score.saturating_sub(10);
            recommendations.push("Use exactly one H1 heading".to_string());
        }
    }

    let has_form = html_lower.contains("<form");
    let has_label = html_lower.contains("<label") || html_lower.contains("aria-label");
    if has_form && !has_label {
        score = score.saturating_sub(15);
        recommendations.push("Label form inputs for assistive technologies".to_string());
    }

    (score, recommendations)
}

/// 合并视觉建议，按前20字符前缀去重
fn merge_recommendations(base: &mut Vec<String>, incoming: &[String]) {
    for candidate in incoming {
        let prefix: String = candidate.chars().take(20).collect();
        let duplicate = base.iter().any(|existing| existing.starts_with(&prefix));
        if !duplicate {
            base.push(candidate.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::extracted::{CookieInfo, Heading, LinkInfo};

    fn compliant_page() -> ExtractedData {
        ExtractedData {
            url: "https://example.org".to_string(),
            html: "<div id=\"onetrust-banner-sdk\">We use cookies</div> GDPR data protection"
                .to_string(),
            headings: vec![Heading { level: 1, text: "Home".to_string(), id: None }],
            links: vec![
                LinkInfo {
                    href: "https://example.org/privacy".to_string(),
                    text: "Privacy Policy".to_string(),
                    internal: true,
                },
                LinkInfo {
                    href: "https://example.org/terms".to_string(),
                    text: "Terms".to_string(),
                    internal: true,
                },
            ],
            cookies: vec![CookieInfo {
                name: "_ga".to_string(),
                domain: ".example.org".to_string(),
                secure: true,
                http_only: false,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_compliant_page_scores_full() {
        let result =
            ComplianceAnalyzer::analyze(&compliant_page(), &VisionAnalysis::degraded());
        assert_eq!(result.score, 100);
        assert!(result.insights.contains("WCAG AA"));
        assert_eq!(result.raw["gdpr_ready"], true);
    }

    #[test]
    fn test_cookies_without_banner_penalized() {
        let mut data = compliant_page();
        data.html = "<p>Plain page</p>".to_string();
        let result = ComplianceAnalyzer::analyze(&data, &VisionAnalysis::degraded());
        assert!(result.score < 100);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("cookie-consent banner")));
    }

    #[test]
    fn test_vision_only_raises_score() {
        let mut data = compliant_page();
        data.html = "<p>Plain page</p>".to_string();
        data.links.clear();

        let mut vision = VisionAnalysis::degraded();
        vision.available = true;
        vision.compliance.score = 10;
        vision.compliance.confidence = 0.9;
        let low = ComplianceAnalyzer::analyze(&data, &vision);

        vision.compliance.score = 95;
        let high = ComplianceAnalyzer::analyze(&data, &vision);

        let text_only =
            ComplianceAnalyzer::analyze(&data, &VisionAnalysis::degraded());
        assert_eq!(low.score, text_only.score);
        assert_eq!(high.score, 95);
    }

    #[test]
    fn test_recommendation_dedup_by_prefix() {
        let mut base = vec!["Add alternative text to images".to_string()];
        merge_recommendations(
            &mut base,
            &[
                "Add alternative text for every product photo".to_string(),
                "Increase color contrast in the hero section".to_string(),
            ],
        );
        assert_eq!(base.len(), 2);
        assert!(base[1].contains("color contrast"));
    }

    #[test]
    fn test_wcag_levels() {
        assert_eq!(WcagLevel::from_accessibility_score(85), WcagLevel::Aa);
        assert_eq!(WcagLevel::from_accessibility_score(65), WcagLevel::A);
        assert_eq!(WcagLevel::from_accessibility_score(40), WcagLevel::Fail);
    }
}
