// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{json, Value};
use sitegrade::analyzers::performance::PerformanceAnalyzer;
use sitegrade::config::settings::PageSpeedSettings;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lighthouse_report(performance: f64, lcp_ms: f64, cls: f64, opportunities: Value) -> Value {
    let mut report = json!({
        "lighthouseResult": {
            "categories": {
                "performance": { "score": performance },
                "accessibility": { "score": 0.9 },
                "best-practices": { "score": 0.8 },
                "seo": { "score": 1.0 }
            },
            "audits": {
                "largest-contentful-paint": { "numericValue": lcp_ms },
                "max-potential-fid": { "numericValue": 120.0 },
                "cumulative-layout-shift": { "numericValue": cls }
            }
        }
    });
    if let Some(extra) = opportunities.as_object() {
        let audits = report["lighthouseResult"]["audits"]
            .as_object_mut()
            .expect("audits object");
        for (key, value) in extra {
            audits.insert(key.clone(), value.clone());
        }
    }
    report
}

fn settings_for(server: &MockServer) -> PageSpeedSettings {
    PageSpeedSettings {
        api_key: Some("test-key".to_string()),
        base_url: format!("{}/pagespeed", server.uri()),
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_category_scores_average_across_strategies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pagespeed"))
        .and(query_param("strategy", "desktop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_report(
            0.9,
            1800.0,
            0.02,
            json!({}),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pagespeed"))
        .and(query_param("strategy", "mobile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_report(
            0.7,
            2400.0,
            0.15,
            json!({}),
        )))
        .mount(&server)
        .await;

    let result = PerformanceAnalyzer::new(&settings_for(&server))
        .analyze("https://example.org", None)
        .await;

    assert!(result.analyzed);
    assert_eq!(result.raw["source"], "speed_audit_api");
    // performance averages to 80, accessibility 90, best-practices 80, seo 100
    assert_eq!(result.raw["categories"]["performance"], 80);
    // (80 + 90 + 80 + 100) / 4 = 87.5 rounds up
    assert_eq!(result.score, 88);
    // Core Web Vitals come from the mobile strategy
    assert_eq!(result.raw["core_web_vitals"]["lcp_ms"], 2400.0);
    assert_eq!(result.raw["core_web_vitals"]["cls"], 0.15);
}

#[tokio::test]
async fn test_opportunities_sorted_by_impact_mobile_first() {
    let server = MockServer::start().await;

    let desktop_opportunities = json!({
        "unused-javascript": {
            "score": 0.6,
            "title": "Reduce unused JavaScript (desktop wording)",
            "details": { "type": "opportunity" }
        }
    });
    let mobile_opportunities = json!({
        "unused-javascript": {
            "score": 0.5,
            "title": "Reduce unused JavaScript",
            "details": { "type": "opportunity" }
        },
        "render-blocking-resources": {
            "score": 0.2,
            "title": "Eliminate render-blocking resources",
            "details": { "type": "opportunity" }
        }
    });

    Mock::given(method("GET"))
        .and(path("/pagespeed"))
        .and(query_param("strategy", "desktop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_report(
            0.8,
            2000.0,
            0.05,
            desktop_opportunities,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pagespeed"))
        .and(query_param("strategy", "mobile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_report(
            0.8,
            2000.0,
            0.05,
            mobile_opportunities,
        )))
        .mount(&server)
        .await;

    let result = PerformanceAnalyzer::new(&settings_for(&server))
        .analyze("https://example.org", None)
        .await;

    let opportunities = result.raw["opportunities"].as_array().unwrap();
    // Lowest sub-score first, and the mobile title wins the merge
    assert_eq!(opportunities[0]["id"], "render-blocking-resources");
    assert_eq!(opportunities[1]["title"], "Reduce unused JavaScript");
    assert_eq!(
        result.recommendations[0],
        "Eliminate render-blocking resources"
    );
}

#[tokio::test]
async fn test_api_error_falls_back_to_heuristics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pagespeed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let extracted = sitegrade::domain::models::extracted::ExtractedData {
        url: "https://example.org".to_string(),
        timings: sitegrade::domain::models::extracted::PerformanceTimings {
            load_time_ms: 900,
            dom_ready_ms: 500,
            first_contentful_paint_ms: 600,
        },
        ..Default::default()
    };

    let result = PerformanceAnalyzer::new(&settings_for(&server))
        .analyze("https://example.org", Some(&extracted))
        .await;

    assert!(result.analyzed);
    assert_eq!(result.raw["source"], "heuristic");
}

#[tokio::test]
async fn test_missing_api_key_skips_api_entirely() {
    let settings = PageSpeedSettings {
        api_key: None,
        base_url: "http://127.0.0.1:1/pagespeed".to_string(),
        timeout_secs: 1,
    };
    let extracted = sitegrade::domain::models::extracted::ExtractedData {
        url: "https://example.org".to_string(),
        ..Default::default()
    };

    let result = PerformanceAnalyzer::new(&settings)
        .analyze("https://example.org", Some(&extracted))
        .await;

    assert!(result.analyzed);
    assert_eq!(result.raw["source"], "heuristic");
}

#[tokio::test]
async fn test_no_api_and_no_snapshot_is_soft_failure() {
    let settings = PageSpeedSettings {
        api_key: None,
        base_url: "http://127.0.0.1:1/pagespeed".to_string(),
        timeout_secs: 1,
    };

    let result = PerformanceAnalyzer::new(&settings)
        .analyze("https://example.org", None)
        .await;

    assert!(!result.analyzed);
    assert_eq!(result.score, 0);
    assert!(result.error.is_some());
}
