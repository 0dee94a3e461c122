// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sitegrade::analyzers::security::SecurityAnalyzer;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_hardened_site_over_http_loses_only_tls_points() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("strict-transport-security", "max-age=63072000")
                .insert_header("content-security-policy", "default-src 'self'")
                .insert_header("x-frame-options", "DENY")
                .insert_header("x-content-type-options", "nosniff")
                .insert_header("x-xss-protection", "1; mode=block")
                .insert_header("referrer-policy", "strict-origin-when-cross-origin"),
        )
        .mount(&server)
        .await;

    let result = SecurityAnalyzer::new().analyze(&server.uri()).await;

    assert!(result.analyzed);
    // All six headers present, but the mock server only speaks plain HTTP
    assert_eq!(result.score, 80);
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.contains("HTTPS")));
    assert_eq!(result.raw["https"], false);
}

#[tokio::test]
async fn test_bare_site_drains_header_penalties() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "Apache/2.4.62")
                .insert_header("x-powered-by", "PHP/8.3"),
        )
        .mount(&server)
        .await;

    let result = SecurityAnalyzer::new().analyze(&server.uri()).await;

    // 60 for missing headers, 20 for HTTP, 10 for two disclosures
    assert_eq!(result.score, 10);
    assert!(result.recommendations.iter().any(|r| r.contains("HSTS")));
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.contains("technology-disclosing")));
    assert_eq!(result.raw["missing_headers"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_unreachable_site_fails_soft() {
    let result = SecurityAnalyzer::new()
        .analyze("http://127.0.0.1:1/unreachable")
        .await;

    assert!(!result.analyzed);
    assert_eq!(result.score, 0);
    assert!(result.error.is_some());
}
