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

use axum::Extension;
use migration::{Migrator, MigratorTrait};
use sitegrade::config::settings::Settings;
use sitegrade::domain::services::notification::EmailSender;
use sitegrade::engines::extractor::BrowserExtractor;
use sitegrade::infrastructure::database::connection;
use sitegrade::infrastructure::email::SmtpMailer;
use sitegrade::infrastructure::repositories::metadata_repo_impl::MetadataRepositoryImpl;
use sitegrade::infrastructure::repositories::request_repo_impl::RequestRepositoryImpl;
use sitegrade::infrastructure::repositories::result_repo_impl::ResultRepositoryImpl;
use sitegrade::presentation::routes;
use sitegrade::utils::telemetry;
use sitegrade::workers::audit_worker::AuditWorker;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting sitegrade...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize repositories and email transport
    let request_repo = Arc::new(RequestRepositoryImpl::new(db.clone()));
    let result_repo = Arc::new(ResultRepositoryImpl::new(db.clone()));
    let metadata_repo = Arc::new(MetadataRepositoryImpl::new(db.clone()));
    let mailer: Arc<dyn EmailSender> = Arc::new(SmtpMailer::new(&settings.smtp)?);

    // 5. Build the audit worker shared by all handlers
    let extractor = Arc::new(BrowserExtractor::new(settings.extraction.clone()));
    let worker = Arc::new(AuditWorker::new(
        request_repo.clone(),
        result_repo.clone(),
        metadata_repo.clone(),
        extractor,
        mailer,
        settings.clone(),
    ));

    // 6. Start HTTP server
    let app = routes::routes()
        .layer(Extension(request_repo))
        .layer(Extension(result_repo))
        .layer(Extension(metadata_repo))
        .layer(Extension(worker))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// 等待关停信号
///
/// 同时监听Ctrl+C与SIGTERM（容器环境下的标准停机信号）。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
