// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ExtractionSettings;
use crate::utils::errors::ExtractionError;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// 浏览器句柄
///
/// 一次分析运行期间由编排器独占持有的浏览器进程资源。
/// 调用方必须在使用结束后显式调用 `close()`，否则会泄漏
/// 浏览器进程。不做跨请求共享的全局单例。
pub struct BrowserHandle {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserHandle {
    /// 启动或连接浏览器实例
    ///
    /// 配置了远程调试地址时连接远程Chrome，否则本地启动。
    ///
    /// # 参数
    ///
    /// * `settings` - 提取引擎配置
    ///
    /// # 返回值
    ///
    /// * `Ok(BrowserHandle)` - 可用的浏览器句柄
    /// * `Err(ExtractionError)` - 启动或连接失败
    pub async fn launch(settings: &ExtractionSettings) -> Result<Self, ExtractionError> {
        let remote_debugging_url = settings
            .remote_debugging_url
            .clone()
            .or_else(|| std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok());

        let (browser, mut handler) = if let Some(ref url) = remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url).await.map_err(|e| {
                ExtractionError::BrowserUnavailable(format!(
                    "Failed to connect to remote Chrome: {}",
                    e
                ))
            })?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(Duration::from_secs(30));

            builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

            Browser::launch(
                builder
                    .build()
                    .map_err(|e| ExtractionError::BrowserUnavailable(e.to_string()))?,
            )
            .await
            .map_err(|e| ExtractionError::BrowserUnavailable(e.to_string()))?
        };

        // Drive CDP events until the connection drops
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// 获取底层浏览器引用
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// 关闭浏览器并释放进程资源
    ///
    /// 成功与失败路径都必须调用；关闭失败只记录日志。
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        self.handler_task.abort();
    }
}
