// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ExtractionSettings;
use crate::domain::models::extracted::{
    CookieInfo, ExtractedData, Heading, ImageInfo, LinkInfo, MetaTag, PerformanceTimings, Viewport,
};
use crate::engines::browser::BrowserHandle;
use crate::engines::consent::{self, ConsentOutcome};
use crate::utils::errors::ExtractionError;
use crate::utils::url_utils;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::Page;
use serde::Deserialize;
use std::time::{Duration, Instant};
use url::Url;

/// 提取选项
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// 首次尝试的整体超时预算；未指定时为45秒
    pub timeout: Option<Duration>,
    /// 是否整页截图
    pub full_page_screenshot: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            full_page_screenshot: true,
        }
    }
}

/// 重试预算：首次45秒，重试60秒，最多两次
const FIRST_ATTEMPT_BUDGET_SECS: u64 = 45;
const RETRY_ATTEMPT_BUDGET_SECS: u64 = 60;

/// 页面快照来源
///
/// 编排器通过该接口获取提取快照，浏览器生命周期由实现方管理。
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractedData, ExtractionError>;
}

/// 基于无头浏览器的快照来源
///
/// 每次提取启动一个浏览器进程，提取结束后无条件释放，
/// 无论提取成功与否。
pub struct BrowserExtractor {
    settings: ExtractionSettings,
}

impl BrowserExtractor {
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Extractor for BrowserExtractor {
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractedData, ExtractionError> {
        let browser = BrowserHandle::launch(&self.settings).await?;
        let engine = ExtractionEngine::new(self.settings.clone());
        let outcome = engine.extract(&browser, url, options).await;
        browser.close().await;
        outcome
    }
}

/// 提取引擎
///
/// 驱动无头浏览器访问目标URL，产出规范化的页面提取快照。
/// 浏览器句柄由调用方（编排器）持有并负责释放。
pub struct ExtractionEngine {
    settings: ExtractionSettings,
}

/// 页面内单次采集脚本的返回结构
#[derive(Debug, Deserialize)]
struct InPageExtract {
    title: Option<String>,
    description: Option<String>,
    canonical: Option<String>,
    lang: Option<String>,
    charset: Option<String>,
    meta_tags: Vec<RawMeta>,
    headings: Vec<RawHeading>,
    images: Vec<RawImage>,
    links: Vec<RawLink>,
    scripts: Vec<String>,
    stylesheets: Vec<String>,
    dom_ready_ms: f64,
    first_contentful_paint_ms: f64,
    viewport_width: u32,
    viewport_height: u32,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    name: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawHeading {
    level: u8,
    text: String,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    src: String,
    alt: Option<String>,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    href: String,
    text: String,
}

impl ExtractionEngine {
    /// 创建新的提取引擎实例
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }

    /// 提取页面快照
    ///
    /// 公共入口，对整个提取流程最多尝试两次（45秒、60秒递增
    /// 预算），两次均失败时返回最后一次的错误。
    ///
    /// # 参数
    ///
    /// * `handle` - 浏览器句柄
    /// * `url` - 目标URL
    /// * `options` - 提取选项
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractedData)` - 页面提取快照
    /// * `Err(ExtractionError)` - 两次尝试均失败
    pub async fn extract(
        &self,
        handle: &BrowserHandle,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractedData, ExtractionError> {
        let budgets = [
            options
                .timeout
                .unwrap_or(Duration::from_secs(FIRST_ATTEMPT_BUDGET_SECS)),
            Duration::from_secs(RETRY_ATTEMPT_BUDGET_SECS),
        ];

        attempt_with_budgets(&budgets, move |budget| {
            self.extract_once(handle, url, options, budget)
        })
        .await
    }

    async fn extract_once(
        &self,
        handle: &BrowserHandle,
        url: &str,
        options: &ExtractOptions,
        budget: Duration,
    ) -> Result<ExtractedData, ExtractionError> {
        let budget_secs = budget.as_secs();

        tokio::time::timeout(budget, async {
            let start = Instant::now();

            let page = handle
                .browser()
                .new_page("about:blank")
                .await
                .map_err(|e| ExtractionError::BrowserUnavailable(e.to_string()))?;

            let navigation = self.navigate(&page, url).await;
            if let Err(e) = navigation {
                let _ = page.close().await;
                return Err(e);
            }

            // Best-effort consent dismissal; never blocks extraction
            match consent::try_dismiss(&page).await {
                ConsentOutcome::Dismissed => {
                    tracing::debug!("Consent banner dismissed for {}", url)
                }
                ConsentOutcome::NotFound => {}
                ConsentOutcome::Failed(reason) => {
                    tracing::debug!("Consent dismissal failed for {}: {}", url, reason)
                }
            }

            let result = self
                .collect(&page, url, options, start)
                .await;
            let _ = page.close().await;
            result
        })
        .await
        .map_err(|_| ExtractionError::Timeout(budget_secs))?
    }

    /// 短后长两段超时导航：先用较短超时尝试一次goto，超时或
    /// 出错后换更长的超时再试一次，两次都失败则整次提取尝试
    /// 失败。goto本身等到页面load事件才返回。
    async fn navigate(&self, page: &Page, url: &str) -> Result<(), ExtractionError> {
        let quick = Duration::from_secs(self.settings.nav_timeout_secs);
        match tokio::time::timeout(quick, page.goto(url)).await {
            Ok(Ok(_)) => return Ok(()),
            Ok(Err(e)) => {
                tracing::debug!("Fast navigation failed for {}: {}, retrying", url, e);
            }
            Err(_) => {
                tracing::debug!(
                    "Fast navigation timed out after {}s for {}, retrying",
                    quick.as_secs(),
                    url
                );
            }
        }

        let patient = Duration::from_secs(self.settings.nav_retry_timeout_secs);
        match tokio::time::timeout(patient, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ExtractionError::NavigationFailed(e.to_string())),
            Err(_) => Err(ExtractionError::NavigationFailed(format!(
                "load wait timed out after {}s",
                patient.as_secs()
            ))),
        }
    }

    /// 单次页面内采集
    async fn collect(
        &self,
        page: &Page,
        url: &str,
        options: &ExtractOptions,
        start: Instant,
    ) -> Result<ExtractedData, ExtractionError> {
        let html = page
            .content()
            .await
            .map_err(|e| ExtractionError::EvaluationFailed(e.to_string()))?;

        let in_page: InPageExtract = page
            .evaluate(EXTRACT_SCRIPT)
            .await
            .map_err(|e| ExtractionError::EvaluationFailed(e.to_string()))?
            .into_value()
            .map_err(|e| ExtractionError::EvaluationFailed(e.to_string()))?;

        let base = Url::parse(url)
            .map_err(|e| ExtractionError::EvaluationFailed(format!("invalid base url: {}", e)))?;

        let images = in_page
            .images
            .into_iter()
            .filter(|i| !i.src.starts_with("data:"))
            .map(|i| ImageInfo {
                src: i.src,
                alt: i.alt,
                width: i.width,
                height: i.height,
            })
            .collect();

        let links = in_page
            .links
            .into_iter()
            .map(|l| {
                let internal = url_utils::is_internal_link(&base, &l.href);
                LinkInfo {
                    href: l.href,
                    text: l.text,
                    internal,
                }
            })
            .collect();

        let cookies = page
            .get_cookies()
            .await
            .map_err(|e| ExtractionError::EvaluationFailed(e.to_string()))?
            .into_iter()
            .map(|c| CookieInfo {
                name: c.name,
                domain: c.domain,
                secure: c.secure,
                http_only: c.http_only,
            })
            .collect();

        let full_page = options.full_page_screenshot && self.settings.full_page_screenshot;
        let screenshot_params = chromiumoxide::page::ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(80)
            .full_page(full_page)
            .build();
        let screenshot = match page.screenshot(screenshot_params).await {
            Ok(bytes) => Some(BASE64.encode(bytes)),
            Err(e) => {
                // The rest of the snapshot is still usable without a screenshot
                tracing::warn!("Screenshot failed for {}: {}", url, e);
                None
            }
        };

        Ok(ExtractedData {
            url: url.to_string(),
            html,
            title: in_page.title.filter(|t| !t.is_empty()),
            description: in_page.description.filter(|d| !d.is_empty()),
            canonical: in_page.canonical.filter(|c| !c.is_empty()),
            lang: in_page.lang.filter(|l| !l.is_empty()),
            charset: in_page.charset.filter(|c| !c.is_empty()),
            meta_tags: in_page
                .meta_tags
                .into_iter()
                .map(|m| MetaTag {
                    name: m.name,
                    content: m.content,
                })
                .collect(),
            headings: in_page
                .headings
                .into_iter()
                .map(|h| Heading {
                    level: h.level,
                    text: h.text,
                    id: h.id.filter(|i| !i.is_empty()),
                })
                .collect(),
            images,
            links,
            scripts: in_page.scripts,
            stylesheets: in_page.stylesheets,
            cookies,
            timings: PerformanceTimings {
                load_time_ms: start.elapsed().as_millis() as u64,
                dom_ready_ms: in_page.dom_ready_ms.max(0.0) as u64,
                first_contentful_paint_ms: in_page.first_contentful_paint_ms.max(0.0) as u64,
            },
            viewport: Viewport {
                width: in_page.viewport_width,
                height: in_page.viewport_height,
            },
            screenshot,
        })
    }
}

/// 按递增预算依次尝试同一操作
///
/// 成功立即返回；失败记录日志后换下一个预算重试；预算耗尽后
/// 返回最后一次的错误。
async fn attempt_with_budgets<T, F, Fut>(
    budgets: &[Duration],
    mut attempt: F,
) -> Result<T, ExtractionError>
where
    F: FnMut(Duration) -> Fut,
    Fut: std::future::Future<Output = Result<T, ExtractionError>>,
{
    let mut last_error = ExtractionError::NavigationFailed("no attempt made".to_string());
    for (index, budget) in budgets.iter().enumerate() {
        match attempt(*budget).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(
                    "Extraction attempt {}/{} failed: {}",
                    index + 1,
                    budgets.len(),
                    e
                );
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// 页面内单次采集脚本
///
/// 一次evaluate调用收集全部结构化数据，避免多次往返。
const EXTRACT_SCRIPT: &str = r#"(() => {
    const metaTags = [];
    for (const m of document.querySelectorAll('meta')) {
        const name = m.getAttribute('name') || m.getAttribute('property');
        const content = m.getAttribute('content');
        if (name && content) metaTags.push({ name, content });
    }

    const headings = [];
    for (const h of document.querySelectorAll('h1, h2, h3, h4, h5, h6')) {
        headings.push({
            level: parseInt(h.tagName.substring(1), 10),
            text: (h.textContent || '').trim().substring(0, 200),
            id: h.id || null
        });
    }

    const images = [];
    for (const img of document.querySelectorAll('img')) {
        const src = img.currentSrc || img.src;
        if (!src) continue;
        images.push({
            src,
            alt: img.getAttribute('alt'),
            width: img.naturalWidth || 0,
            height: img.naturalHeight || 0
        });
    }

    const links = [];
    for (const a of document.querySelectorAll('a[href]')) {
        if (!a.href || a.href.startsWith('javascript:')) continue;
        links.push({ href: a.href, text: (a.textContent || '').trim().substring(0, 100) });
    }

    const scripts = [];
    for (const s of document.querySelectorAll('script[src]')) {
        scripts.push(s.src);
    }

    const stylesheets = [];
    for (const l of document.querySelectorAll('link[rel="stylesheet"][href]')) {
        stylesheets.push(l.href);
    }

    const descriptionEl = document.querySelector('meta[name="description"]');
    const canonicalEl = document.querySelector('link[rel="canonical"]');
    const charsetEl = document.querySelector('meta[charset]');

    const timing = performance.timing;
    const domReadyMs = timing.domContentLoadedEventEnd > 0
        ? timing.domContentLoadedEventEnd - timing.navigationStart
        : 0;

    let fcpMs = 0;
    try {
        const paints = performance.getEntriesByType('paint');
        const fcp = paints.find(p => p.name === 'first-contentful-paint');
        if (fcp) fcpMs = fcp.startTime;
    } catch (e) { /* paint timing unsupported */ }

    return {
        title: document.title || null,
        description: descriptionEl ? descriptionEl.getAttribute('content') : null,
        canonical: canonicalEl ? canonicalEl.href : null,
        lang: document.documentElement.lang || null,
        charset: charsetEl ? charsetEl.getAttribute('charset') : (document.characterSet || null),
        meta_tags: metaTags,
        headings,
        images,
        links,
        scripts,
        stylesheets,
        dom_ready_ms: domReadyMs,
        first_contentful_paint_ms: fcpMs,
        viewport_width: window.innerWidth,
        viewport_height: window.innerHeight
    };
})()"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_second_attempt_recovers_from_navigation_failure() {
        let calls = AtomicUsize::new(0);
        let budgets = [Duration::from_secs(45), Duration::from_secs(60)];

        let result = attempt_with_budgets(&budgets, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ExtractionError::NavigationFailed(
                        "connection reset".to_string(),
                    ))
                } else {
                    Ok(7u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_budgets_exhausted_surfaces_last_error_without_third_attempt() {
        let calls = AtomicUsize::new(0);
        let budgets = [Duration::from_secs(45), Duration::from_secs(60)];

        let result: Result<(), ExtractionError> = attempt_with_budgets(&budgets, |budget| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(ExtractionError::Timeout(budget.as_secs())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match result {
            Err(ExtractionError::Timeout(secs)) => assert_eq!(secs, 60),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
