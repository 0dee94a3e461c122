// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::repositories::metadata_repo_impl::MetadataRepositoryImpl;
use crate::infrastructure::repositories::request_repo_impl::RequestRepositoryImpl;
use crate::infrastructure::repositories::result_repo_impl::ResultRepositoryImpl;
use crate::presentation::handlers::{process_handler, status_handler, submit_handler};
use axum::{
    routing::{get, post},
    Router,
};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let audit_routes = Router::new()
        .route(
            "/v1/audits",
            post(
                submit_handler::submit::<
                    RequestRepositoryImpl,
                    ResultRepositoryImpl,
                    MetadataRepositoryImpl,
                >,
            ),
        )
        .route(
            "/v1/audits/{id}",
            get(status_handler::get_status::<
                RequestRepositoryImpl,
                ResultRepositoryImpl,
                MetadataRepositoryImpl,
            >),
        )
        .route(
            "/v1/audits/{id}/process",
            post(
                process_handler::process::<
                    RequestRepositoryImpl,
                    ResultRepositoryImpl,
                    MetadataRepositoryImpl,
                >,
            ),
        );

    Router::new().merge(public_routes).merge(audit_routes)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
