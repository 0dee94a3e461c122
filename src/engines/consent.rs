// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chromiumoxide::Page;
use std::time::Duration;

/// Cookie同意横幅处理结果
///
/// `Failed` 从不向上传播，只作为日志信息存在。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// 找到并点击了同意按钮
    Dismissed,
    /// 页面上没有匹配的同意UI
    NotFound,
    /// 查找或点击过程出错（被吞掉）
    Failed(String),
}

/// 已知同意组件的CSS选择器模式，先于文本扫描尝试
const CONSENT_SELECTORS: [&str; 8] = [
    "#onetrust-accept-btn-handler",
    "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll",
    "#didomi-notice-agree-button",
    ".cc-allow",
    ".cc-accept",
    "[id*=accept]",
    "[class*=cookie-accept]",
    "[aria-label*=accept]",
];

/// 多语言同意短语，用于按钮文本扫描
const CONSENT_PHRASES: [&str; 14] = [
    "accept all",
    "accept cookies",
    "accept",
    "i agree",
    "agree",
    "allow all",
    "got it",
    "akzeptieren",
    "alle akzeptieren",
    "accepter",
    "aceptar",
    "accetta",
    "akkoord",
    "同意",
];

/// 尽力关闭Cookie同意横幅
///
/// 导航完成后短暂等待，依次尝试固定选择器列表与多语言文本
/// 扫描，点击第一个可见匹配项。所有失败都被静默吞掉，此函数
/// 永远不会出错，也不会阻塞提取流程。
pub async fn try_dismiss(page: &Page) -> ConsentOutcome {
    // Give late-loading consent widgets a moment to render
    tokio::time::sleep(Duration::from_millis(1500)).await;

    for selector in CONSENT_SELECTORS {
        match page.find_element(selector).await {
            Ok(element) => {
                if element.click().await.is_ok() {
                    tracing::debug!("Dismissed consent banner via selector {}", selector);
                    return ConsentOutcome::Dismissed;
                }
            }
            Err(_) => continue,
        }
    }

    // Text-content scan over clickable elements
    let phrases_json = match serde_json::to_string(&CONSENT_PHRASES) {
        Ok(json) => json,
        Err(e) => return ConsentOutcome::Failed(e.to_string()),
    };
    let script = format!(
        r#"(() => {{
            const phrases = {phrases};
            const candidates = document.querySelectorAll('button, a, [role="button"]');
            for (const el of candidates) {{
                if (!el.offsetParent) continue;
                const text = (el.textContent || '').trim().toLowerCase();
                if (!text || text.length > 40) continue;
                if (phrases.some(p => text === p || text.startsWith(p))) {{
                    el.click();
                    return true;
                }}
            }}
            return false;
        }})()"#,
        phrases = phrases_json
    );

    match page.evaluate(script).await {
        Ok(result) => match result.into_value::<bool>() {
            Ok(true) => {
                tracing::debug!("Dismissed consent banner via text scan");
                ConsentOutcome::Dismissed
            }
            Ok(false) => ConsentOutcome::NotFound,
            Err(e) => ConsentOutcome::Failed(e.to_string()),
        },
        Err(e) => ConsentOutcome::Failed(e.to_string()),
    }
}

/// 判断按钮文本是否为同意短语（文本扫描的纯逻辑部分）
pub fn matches_consent_phrase(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    if text.is_empty() || text.len() > 40 {
        return false;
    }
    CONSENT_PHRASES
        .iter()
        .any(|p| text == *p || text.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_common_phrases() {
        assert!(matches_consent_phrase("Accept all"));
        assert!(matches_consent_phrase("  I AGREE  "));
        assert!(matches_consent_phrase("Alle akzeptieren"));
        assert!(matches_consent_phrase("同意"));
    }

    #[test]
    fn test_rejects_unrelated_text() {
        assert!(!matches_consent_phrase("Learn more"));
        assert!(!matches_consent_phrase(""));
        // Long marketing copy never counts as a consent button
        assert!(!matches_consent_phrase(
            "We accept all major credit cards and process payments securely"
        ));
    }
}
