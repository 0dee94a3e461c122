// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ExtractionSettings;
use crate::domain::models::pillar::{PillarName, PillarResult};
use crate::domain::models::vision::VisionAnalysis;
use crate::engines::browser::BrowserHandle;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::Page;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// 响应式支柱分析器
///
/// 独立启动自己的浏览器会话，在三个固定视口（移动端390×844、
/// 平板768×1024、桌面1920×1080）下依次加载页面并执行页内布局
/// 检查。四个子分数（移动/平板/桌面/跨设备一致性）各自从100起
/// 扣分，总分取无权重平均。浏览器任一环节失败时整个支柱软失败。
pub struct ResponsivenessAnalyzer {
    settings: ExtractionSettings,
}

/// 单视口检查结果（页内脚本返回）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewportCheck {
    #[serde(default)]
    horizontal_overflow: bool,
    #[serde(default)]
    overflow_px: f64,
    #[serde(default)]
    small_text_count: u32,
    #[serde(default)]
    small_target_count: u32,
    #[serde(default)]
    nav_overflow: bool,
    #[serde(default)]
    content_width_ratio: f64,
}

struct DeviceProfile {
    label: &'static str,
    width: u32,
    height: u32,
    mobile: bool,
}

const DEVICE_PROFILES: [DeviceProfile; 3] = [
    DeviceProfile { label: "mobile", width: 390, height: 844, mobile: true },
    DeviceProfile { label: "tablet", width: 768, height: 1024, mobile: false },
    DeviceProfile { label: "desktop", width: 1920, height: 1080, mobile: false },
];

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(20);

const VIEWPORT_CHECK_SCRIPT: &str = r#"
(() => {
    const doc = document.documentElement;
    const overflowPx = Math.max(0, doc.scrollWidth - window.innerWidth);

    let smallTextCount = 0;
    let smallTargetCount = 0;
    const elements = document.querySelectorAll('body *');
    for (const el of elements) {
        const style = window.getComputedStyle(el);
        if (el.innerText && el.innerText.trim().length > 0) {
            const size = parseFloat(style.fontSize);
            if (!Number.isNaN(size) && size < 14) smallTextCount++;
        }
    }
    for (const el of document.querySelectorAll('a, button, input[type=submit], [role=button]')) {
        const rect = el.getBoundingClientRect();
        if (rect.width > 0 && (rect.width < 44 || rect.height < 44)) smallTargetCount++;
    }

    let navOverflow = false;
    const nav = document.querySelector('nav, header');
    if (nav) {
        navOverflow = nav.scrollWidth > nav.clientWidth + 1;
    }

    let contentWidth = 0;
    const main = document.querySelector('main, #root, #app, body');
    if (main) {
        contentWidth = main.getBoundingClientRect().width;
    }

    return JSON.stringify({
        horizontalOverflow: overflowPx > 1,
        overflowPx: overflowPx,
        smallTextCount: smallTextCount,
        smallTargetCount: smallTargetCount,
        navOverflow: navOverflow,
        contentWidthRatio: window.innerWidth > 0 ? contentWidth / window.innerWidth : 0
    });
})()
"#;

impl ResponsivenessAnalyzer {
    /// 创建新的响应式分析器实例
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }

    /// 分析页面在多视口下的响应式表现
    pub async fn analyze(&self, url: &str, vision: &VisionAnalysis) -> PillarResult {
        let browser = match BrowserHandle::launch(&self.settings).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Responsiveness analysis unavailable: {}", e);
                return PillarResult::failed(
                    PillarName::Responsiveness,
                    format!("Browser unavailable: {}", e),
                );
            }
        };

        let outcome = self.check_all_viewports(&browser, url).await;
        browser.close().await;

        match outcome {
            Ok(checks) => score_viewports(&checks, vision),
            Err(e) => PillarResult::failed(PillarName::Responsiveness, e),
        }
    }

    /// 依次在三个视口下加载并检查页面
    async fn check_all_viewports(
        &self,
        browser: &BrowserHandle,
        url: &str,
    ) -> Result<Vec<ViewportCheck>, String> {
        let mut checks = Vec::with_capacity(DEVICE_PROFILES.len());

        for profile in &DEVICE_PROFILES {
            let page = browser
                .browser()
                .new_page("about:blank")
                .await
                .map_err(|e| format!("Failed to open page for {}: {}", profile.label, e))?;

            let result = self.check_viewport(&page, url, profile).await;
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close {} viewport page: {}", profile.label, e);
            }
            checks.push(result?);
        }

        Ok(checks)
    }

    async fn check_viewport(
        &self,
        page: &Page,
        url: &str,
        profile: &DeviceProfile,
    ) -> Result<ViewportCheck, String> {
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(profile.width as i64)
            .height(profile.height as i64)
            .device_scale_factor(if profile.mobile { 2.0 } else { 1.0 })
            .mobile(profile.mobile)
            .build()
            .map_err(|e| format!("Invalid device metrics for {}: {}", profile.label, e))?;
        page.execute(metrics)
            .await
            .map_err(|e| format!("Failed to emulate {} viewport: {}", profile.label, e))?;

        tokio::time::timeout(NAVIGATION_TIMEOUT, page.goto(url))
            .await
            .map_err(|_| format!("Navigation timed out on {} viewport", profile.label))?
            .map_err(|e| format!("Navigation failed on {} viewport: {}", profile.label, e))?;

        // Let the layout settle after the viewport change
        tokio::time::sleep(Duration::from_millis(500)).await;

        let raw: String = page
            .evaluate(VIEWPORT_CHECK_SCRIPT)
            .await
            .map_err(|e| format!("Viewport check failed on {}: {}", profile.label, e))?
            .into_value()
            .map_err(|e| format!("Viewport check returned no value on {}: {}", profile.label, e))?;

        serde_json::from_str(&raw)
            .map_err(|e| format!("Malformed viewport check on {}: {}", profile.label, e))
    }
}

/// 由三份视口检查计算四个子分数并汇总
fn score_viewports(checks: &[ViewportCheck], vision: &VisionAnalysis) -> PillarResult {
    let mobile = &checks[0];
    let tablet = &checks[1];
    let desktop = &checks[2];

    let mut recommendations = Vec::new();
    let mut findings = Vec::new();

    let mut mobile_score = 100u32;
    if mobile.horizontal_overflow {
        mobile_score = mobile_score.saturating_sub(25);
        findings.push(format!(
            "mobile horizontal overflow {:.0}px",
            mobile.overflow_px
        ));
        recommendations.push("Eliminate horizontal scrolling on mobile viewports".to_string());
    }
    if mobile.small_text_count > 0 {
        mobile_score = mobile_score.saturating_sub(15);
        recommendations.push("Use at least 14px text on mobile".to_string());
    }
    if mobile.small_target_count > 0 {
        mobile_score = mobile_score.saturating_sub(15);
        recommendations.push("Size touch targets to at least 44x44px".to_string());
    }

    let mut tablet_score = 100u32;
    if tablet.horizontal_overflow {
        tablet_score = tablet_score.saturating_sub(20);
        recommendations.push("Fix layout overflow on tablet viewports".to_string());
    }
    if tablet.nav_overflow {
        tablet_score = tablet_score.saturating_sub(10);
        recommendations.push("Make the navigation bar fit tablet widths".to_string());
    }

    let mut desktop_score = 100u32;
    if desktop.horizontal_overflow {
        desktop_score = desktop_score.saturating_sub(10);
        recommendations.push("Fix layout overflow on desktop viewports".to_string());
    }
    if desktop.content_width_ratio > 0.0 && desktop.content_width_ratio < 0.7 {
        desktop_score = desktop_score.saturating_sub(10);
        recommendations.push("Use more of the available width on large screens".to_string());
    }

    let layout_breaks = checks.iter().filter(|c| c.horizontal_overflow).count() as u32
        + u32::from(mobile.small_text_count > 0)
        + u32::from(mobile.small_target_count > 0)
        + u32::from(tablet.nav_overflow);
    let mut consistency_score = 100u32;
    if layout_breaks > 5 {
        consistency_score = consistency_score.saturating_sub(25);
        recommendations.push("Adopt a consistent responsive layout strategy".to_string());
    } else if layout_breaks > 2 {
        consistency_score = consistency_score.saturating_sub(10);
    }

    // Vision issues enrich the narrative but never move the score
    if vision.available {
        for issue in &vision.responsiveness.issues {
            findings.push(issue.clone());
        }
    }

    let score = (mobile_score + tablet_score + desktop_score + consistency_score) / 4;

    PillarResult {
        pillar: PillarName::Responsiveness,
        score,
        analyzed: true,
        insights: if findings.is_empty() {
            "Layout holds across mobile, tablet and desktop viewports".to_string()
        } else {
            findings.join("; ")
        },
        recommendations,
        raw: json!({
            "mobile_score": mobile_score,
            "tablet_score": tablet_score,
            "desktop_score": desktop_score,
            "consistency_score": consistency_score,
            "layout_breaks": layout_breaks,
        }),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_check() -> ViewportCheck {
        ViewportCheck {
            horizontal_overflow: false,
            overflow_px: 0.0,
            small_text_count: 0,
            small_target_count: 0,
            nav_overflow: false,
            content_width_ratio: 0.9,
        }
    }

    #[test]
    fn test_clean_layout_scores_full() {
        let checks = vec![clean_check(), clean_check(), clean_check()];
        let result = score_viewports(&checks, &VisionAnalysis::degraded());
        assert_eq!(result.score, 100);
        assert!(result.analyzed);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_mobile_overflow_and_small_targets() {
        let mut mobile = clean_check();
        mobile.horizontal_overflow = true;
        mobile.overflow_px = 120.0;
        mobile.small_target_count = 3;
        let checks = vec![mobile, clean_check(), clean_check()];
        let result = score_viewports(&checks, &VisionAnalysis::degraded());
        // mobile 60, others 100, consistency 100 -> 90
        assert_eq!(result.score, 90);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("44x44")));
    }

    #[test]
    fn test_pervasive_breakage_hits_consistency() {
        let mut mobile = clean_check();
        mobile.horizontal_overflow = true;
        mobile.small_text_count = 4;
        mobile.small_target_count = 2;
        let mut tablet = clean_check();
        tablet.horizontal_overflow = true;
        tablet.nav_overflow = true;
        let mut desktop = clean_check();
        desktop.horizontal_overflow = true;
        let checks = vec![mobile, tablet, desktop];
        let result = score_viewports(&checks, &VisionAnalysis::degraded());
        // 6 layout breaks trip the consistency penalty
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("consistent responsive layout")));
        assert!(result.score < 80);
    }

    #[test]
    fn test_vision_issues_are_textual_only() {
        let checks = vec![clean_check(), clean_check(), clean_check()];
        let mut vision = VisionAnalysis::degraded();
        vision.available = true;
        vision.responsiveness.issues = vec!["Hero image crops on narrow screens".to_string()];
        let result = score_viewports(&checks, &vision);
        assert_eq!(result.score, 100);
        assert!(result.insights.contains("Hero image crops"));
    }
}
