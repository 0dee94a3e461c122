// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::analyzers::apply_penalties;
use crate::domain::models::extracted::ExtractedData;
use crate::domain::models::pillar::{PillarName, PillarResult};
use scraper::{Html, Selector};
use serde_json::json;
use std::time::Duration;
use url::Url;

/// SEO支柱分析器
///
/// 基于提取快照的页面内检查（标题、描述、标题层级、alt覆盖
/// 率、canonical、Open Graph/Twitter卡、结构化数据），外加需要
/// 实时请求的进阶检查（robots.txt与sitemap.xml存在性）。
pub struct SeoAnalyzer {
    client: reqwest::Client,
}

impl Default for SeoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SeoAnalyzer {
    /// 创建新的SEO分析器实例
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// 分析页面SEO
    pub async fn analyze(&self, data: &ExtractedData) -> PillarResult {
        let mut penalties = 0u32;
        let mut recommendations = Vec::new();
        let mut findings = Vec::new();

        // Title: 30-60 chars is the optimal band
        match &data.title {
            None => {
                penalties += 15;
                recommendations.push("Add a <title> tag".to_string());
            }
            Some(title) => {
                let len = title.chars().count();
                findings.push(format!("title length {}", len));
                if !(30..=60).contains(&len) {
                    penalties += 5;
                    recommendations
                        .push("Keep the title between 30 and 60 characters".to_string());
                }
            }
        }

        // Meta description: 120-160 chars optimal
        match &data.description {
            None => {
                penalties += 10;
                recommendations.push("Add a meta description".to_string());
            }
            Some(description) => {
                let len = description.chars().count();
                findings.push(format!("description length {}", len));
                if !(120..=160).contains(&len) {
                    penalties += 5;
                    recommendations
                        .push("Keep the meta description between 120 and 160 characters".to_string());
                }
            }
        }

        // Heading structure: exactly one H1
        let h1_count = data.headings.iter().filter(|h| h.level == 1).count();
        findings.push(format!("{} h1 elements", h1_count));
        if h1_count == 0 {
            penalties += 10;
            recommendations.push("Add exactly one H1 heading".to_string());
        } else if h1_count > 1 {
            penalties += 5;
            recommendations.push("Use a single H1 heading per page".to_string());
        }

        // Image alt coverage
        if !data.images.is_empty() {
            let with_alt = data
                .images
                .iter()
                .filter(|i| i.alt.as_deref().is_some_and(|a| !a.is_empty()))
                .count();
            let coverage = with_alt as f64 / data.images.len() as f64;
            findings.push(format!("alt coverage {:.0}%", coverage * 100.0));
            if coverage < 0.5 {
                penalties += 10;
                recommendations.push("Add alt text to images".to_string());
            } else if coverage < 0.9 {
                penalties += 5;
                recommendations.push("Complete alt text coverage for all images".to_string());
            }
        }

        // Canonical tag
        if data.canonical.is_none() {
            penalties += 5;
            recommendations.push("Add a canonical link tag".to_string());
        }

        // Open Graph / Twitter Card completeness
        let has_meta = |name: &str| data.meta_tags.iter().any(|m| m.name == name);
        let og_complete =
            has_meta("og:title") && has_meta("og:description") && has_meta("og:image");
        if !og_complete {
            penalties += 5;
            recommendations.push("Complete Open Graph tags (title, description, image)".to_string());
        }
        if !has_meta("twitter:card") {
            penalties += 3;
            recommendations.push("Add a twitter:card meta tag".to_string());
        }

        // Structured data
        if !has_structured_data(&data.html) {
            penalties += 5;
            recommendations.push("Add JSON-LD structured data".to_string());
        }

        // Advanced checks: robots.txt / sitemap.xml need live fetches
        let (robots_ok, sitemap_ok) = self.check_crawl_files(&data.url).await;
        if !robots_ok {
            penalties += 5;
            recommendations.push("Provide a robots.txt file".to_string());
        }
        if !sitemap_ok {
            penalties += 5;
            recommendations.push("Provide a sitemap.xml file".to_string());
        }

        let score = apply_penalties(penalties);

        PillarResult {
            pillar: PillarName::Seo,
            score,
            analyzed: true,
            insights: findings.join("; "),
            recommendations,
            raw: json!({
                "h1_count": h1_count,
                "robots_txt": robots_ok,
                "sitemap_xml": sitemap_ok,
                "open_graph_complete": og_complete,
            }),
            error: None,
        }
    }

    /// 检查robots.txt与sitemap.xml的存在性
    ///
    /// 网络失败与404同样按缺失处理，不会让支柱失败。
    async fn check_crawl_files(&self, url: &str) -> (bool, bool) {
        let origin = match Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => format!("{}://{}", parsed.scheme(), host_with_port(&parsed, host)),
                None => return (false, false),
            },
            Err(_) => return (false, false),
        };

        let robots = self.probe(&format!("{}/robots.txt", origin)).await;
        let sitemap = self.probe(&format!("{}/sitemap.xml", origin)).await;
        (robots, sitemap)
    }

    async fn probe(&self, url: &str) -> bool {
        match self
            .client
            .get(url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Crawl file probe failed for {}: {}", url, e);
                false
            }
        }
    }
}

fn host_with_port(parsed: &Url, host: &str) -> String {
    match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// 检测JSON-LD结构化数据
fn has_structured_data(html: &str) -> bool {
    let document = Html::parse_document(html);
    match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::extracted::{Heading, ImageInfo, MetaTag};

    fn optimal_page() -> ExtractedData {
        ExtractedData {
            url: "https://example.org".to_string(),
            html: r#"<script type="application/ld+json">{"@type":"Organization"}</script>"#
                .to_string(),
            title: Some("A perfectly sized page title for search engines".to_string()),
            description: Some(
                "This meta description is carefully written to land inside the optimal length \
                 band of one hundred twenty to one hundred sixty characters total."
                    .to_string(),
            ),
            canonical: Some("https://example.org".to_string()),
            headings: vec![Heading {
                level: 1,
                text: "Welcome".to_string(),
                id: None,
            }],
            meta_tags: vec![
                MetaTag { name: "og:title".to_string(), content: "t".to_string() },
                MetaTag { name: "og:description".to_string(), content: "d".to_string() },
                MetaTag { name: "og:image".to_string(), content: "i".to_string() },
                MetaTag { name: "twitter:card".to_string(), content: "summary".to_string() },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_structured_data_detection() {
        assert!(has_structured_data(
            r#"<script type="application/ld+json">{}</script>"#
        ));
        assert!(!has_structured_data("<script>var x = 1;</script>"));
    }

    #[tokio::test]
    async fn test_missing_title_and_h1_penalized() {
        let mut data = optimal_page();
        data.title = None;
        data.headings.clear();
        let result = SeoAnalyzer::new().analyze(&data).await;
        assert!(result.analyzed);
        assert!(result.recommendations.iter().any(|r| r.contains("<title>")));
        assert!(result.recommendations.iter().any(|r| r.contains("H1")));
    }

    #[tokio::test]
    async fn test_alt_coverage_penalty() {
        let mut data = optimal_page();
        data.images = vec![
            ImageInfo { src: "https://example.org/a.png".to_string(), alt: None, width: 10, height: 10 },
            ImageInfo { src: "https://example.org/b.png".to_string(), alt: Some("logo".to_string()), width: 10, height: 10 },
        ];
        let result = SeoAnalyzer::new().analyze(&data).await;
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("alt text coverage") || r.contains("Add alt text")));
    }

    #[tokio::test]
    async fn test_description_length_band() {
        let mut data = optimal_page();
        data.description = Some("too short".to_string());
        let result = SeoAnalyzer::new().analyze(&data).await;
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("120 and 160")));
    }
}
