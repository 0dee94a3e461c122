// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use serde_json::json;
use sitegrade::config::settings::{
    DatabaseSettings, ExtractionSettings, PageSpeedSettings, ServerSettings, Settings,
    SmtpSettings, VisionSettings,
};
use sitegrade::domain::services::notification::{EmailMessage, EmailSender};
use sitegrade::engines::extractor::BrowserExtractor;
use sitegrade::infrastructure::database::connection;
use sitegrade::infrastructure::repositories::metadata_repo_impl::MetadataRepositoryImpl;
use sitegrade::infrastructure::repositories::request_repo_impl::RequestRepositoryImpl;
use sitegrade::infrastructure::repositories::result_repo_impl::ResultRepositoryImpl;
use sitegrade::presentation::routes;
use sitegrade::workers::audit_worker::AuditWorker;
use std::sync::Arc;
use std::time::Duration;

struct NullMailer;

#[async_trait::async_trait]
impl EmailSender for NullMailer {
    async fn send(&self, _to: &str, _message: &EmailMessage) -> bool {
        true
    }
}

fn test_settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            // In-memory sqlite lives per connection
            max_connections: Some(1),
            min_connections: Some(1),
            connect_timeout: Some(5),
            idle_timeout: None,
        },
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        smtp: SmtpSettings {
            host: "localhost".to_string(),
            port: 2525,
            username: None,
            password: None,
            from: "reports@sitegrade.local".to_string(),
        },
        pagespeed: PageSpeedSettings {
            api_key: None,
            base_url: "http://127.0.0.1:9/pagespeed".to_string(),
            timeout_secs: 1,
        },
        vision: VisionSettings {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "http://127.0.0.1:9/v1".to_string(),
        },
        extraction: ExtractionSettings {
            nav_timeout_secs: 1,
            nav_retry_timeout_secs: 1,
            full_page_screenshot: false,
            // Fails fast at the browser stage so pipeline runs need no Chrome
            remote_debugging_url: Some("http://127.0.0.1:9".to_string()),
        },
    }
}

async fn test_server() -> TestServer {
    let settings = test_settings();
    let db = Arc::new(
        connection::create_pool(&settings.database)
            .await
            .expect("sqlite pool"),
    );
    Migrator::up(db.as_ref(), None).await.expect("migrations");

    let request_repo = Arc::new(RequestRepositoryImpl::new(db.clone()));
    let result_repo = Arc::new(ResultRepositoryImpl::new(db.clone()));
    let metadata_repo = Arc::new(MetadataRepositoryImpl::new(db.clone()));
    let extractor = Arc::new(BrowserExtractor::new(settings.extraction.clone()));
    let worker = Arc::new(AuditWorker::new(
        request_repo.clone(),
        result_repo.clone(),
        metadata_repo.clone(),
        extractor,
        Arc::new(NullMailer),
        settings,
    ));

    let app = routes::routes()
        .layer(Extension(request_repo))
        .layer(Extension(result_repo))
        .layer(Extension(metadata_repo))
        .layer(Extension(worker));

    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn test_health_and_version() {
    let server = test_server().await;

    let health = server.get("/health").await;
    health.assert_status_ok();
    health.assert_text("OK");

    let version = server.get("/v1/version").await;
    version.assert_status_ok();
    assert!(!version.text().is_empty());
}

#[tokio::test]
async fn test_submit_validates_input() {
    let server = test_server().await;

    let bad_url = server
        .post("/v1/audits")
        .json(&json!({ "url": "not a url", "email": "user@example.org" }))
        .await;
    bad_url.assert_status_bad_request();

    let bad_email = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://example.org", "email": "not-an-email" }))
        .await;
    bad_email.assert_status_bad_request();

    let disposable = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://example.org", "email": "user@mailinator.com" }))
        .await;
    disposable.assert_status_bad_request();
}

#[tokio::test]
async fn test_submit_rejects_duplicate_email() {
    let server = test_server().await;

    let first = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://example.org", "email": "user@example.org" }))
        .await;
    first.assert_status(axum::http::StatusCode::ACCEPTED);
    assert_eq!(first.json::<serde_json::Value>()["success"], true);

    let second = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://other.example", "email": "User@Example.org" }))
        .await;
    second.assert_status(axum::http::StatusCode::CONFLICT);
    let body = second.json::<serde_json::Value>();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("already exists for this email"));
}

#[tokio::test]
async fn test_status_of_unknown_request() {
    let server = test_server().await;

    let response = server
        .get(&format!("/v1/audits/{}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_submitted_request_eventually_fails_without_browser() {
    let server = test_server().await;

    let submit = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://example.org", "email": "pipeline@example.org" }))
        .await;
    submit.assert_status(axum::http::StatusCode::ACCEPTED);
    let request_id = submit.json::<serde_json::Value>()["request_id"]
        .as_str()
        .unwrap()
        .to_string();

    // The fire-and-forget pipeline fails fast at the browser stage;
    // poll until the persisted status settles
    let mut status = String::new();
    for _ in 0..50 {
        let response = server.get(&format!("/v1/audits/{}", request_id)).await;
        response.assert_status_ok();
        status = response.json::<serde_json::Value>()["status"]
            .as_str()
            .unwrap()
            .to_string();
        if status == "failed" || status == "completed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(status, "failed");

    // A settled request can no longer be re-triggered
    let retrigger = server
        .post(&format!("/v1/audits/{}/process", request_id))
        .await;
    retrigger.assert_status(axum::http::StatusCode::CONFLICT);
}
