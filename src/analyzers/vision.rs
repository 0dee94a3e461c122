// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::VisionSettings;
use crate::domain::models::vision::{
    VisionAnalysis, VisionCompliance, VisionDesign, VisionResponsiveness,
};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::time::Duration;

/// 视觉分析服务 - 处理与多模态模型提供商的交互
///
/// 截图只向外部模型发送一次，组合响应被扇出为设计、响应式、
/// 合规三个支柱形状的子结果。一次组合调用替代三次独立调用能
/// 大幅降低外部API成本，这是明确的设计取舍（成本优先于支柱
/// 隔离）。
///
/// # 失败语义
///
/// 软失败：任何网络或解析失败都返回降级默认结果而非传播错误。
/// 下游支柱必须以与视觉结果缺席完全相同的方式处理降级结果。
pub struct VisionService {
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    client: reqwest::Client,
}

impl VisionService {
    /// 创建新的视觉分析服务实例
    pub fn new(settings: &VisionSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.base_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// 组合视觉分析
    ///
    /// # 参数
    ///
    /// * `screenshot_b64` - base64编码的JPEG截图
    /// * `url` - 被审计的页面URL（仅用于提示词上下文）
    ///
    /// # 返回值
    ///
    /// 三视图组合结果；调用失败时为降级默认值（available=false）
    pub async fn analyze_combined(&self, screenshot_b64: &str, url: &str) -> VisionAnalysis {
        match self.request_combined(screenshot_b64, url).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Vision analysis degraded for {}: {}", url, e);
                VisionAnalysis::degraded()
            }
        }
    }

    /// 独立的合规视觉分析（供单独使用）
    pub async fn analyze_compliance(&self, screenshot_b64: &str, url: &str) -> VisionCompliance {
        self.analyze_combined(screenshot_b64, url).await.compliance
    }

    async fn request_combined(&self, screenshot_b64: &str, url: &str) -> Result<VisionAnalysis> {
        let api_key = self
            .api_key
            .as_ref()
            .context("Vision API key not configured")?;

        let prompt = format!(
            "You are auditing the website {} from a full-page screenshot. \
             Return ONLY a valid JSON object, no markdown formatting, with this shape: \
             {{\"design\": {{\"primary_cta\": string|null, \"visual_style\": string, \
             \"issues\": [string], \"recommendations\": [string]}}, \
             \"responsiveness\": {{\"issues\": [string]}}, \
             \"compliance\": {{\"cookie_banner_detected\": bool, \
             \"privacy_link_detected\": bool, \"score\": integer 0-100, \
             \"confidence\": number 0-1, \"recommendations\": [string]}}}}",
            url
        );

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": prompt },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:image/jpeg;base64,{}", screenshot_b64)
                            }
                        }
                    ]
                }
            ],
            "temperature": 0.0
        });

        let endpoint = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .timeout(Duration::from_secs(45))
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to vision API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Vision API returned error: {} - {}", status, error_text);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse vision API response")?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .context("Invalid response format from vision API")?;

        parse_combined(content)
    }
}

/// 解析模型返回的组合JSON（容忍markdown代码块包裹）
fn parse_combined(content: &str) -> Result<VisionAnalysis> {
    let clean_content = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```");

    let value: Value =
        serde_json::from_str(clean_content).context("Failed to parse vision JSON content")?;

    let design: VisionDesign =
        serde_json::from_value(value.get("design").cloned().unwrap_or(json!({})))
            .unwrap_or_default();
    let responsiveness: VisionResponsiveness =
        serde_json::from_value(value.get("responsiveness").cloned().unwrap_or(json!({})))
            .unwrap_or_default();
    let mut compliance: VisionCompliance =
        serde_json::from_value(value.get("compliance").cloned().unwrap_or(json!({})))
            .unwrap_or_default();
    compliance.score = compliance.score.min(100);

    Ok(VisionAnalysis {
        available: true,
        design,
        responsiveness,
        compliance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_combined_plain_json() {
        let content = r#"{
            "design": {"primary_cta": "Sign up", "visual_style": "modern",
                       "issues": ["low contrast hero"], "recommendations": ["increase contrast"]},
            "responsiveness": {"issues": ["nav wraps on tablet"]},
            "compliance": {"cookie_banner_detected": true, "privacy_link_detected": false,
                           "score": 70, "confidence": 0.8, "recommendations": []}
        }"#;
        let analysis = parse_combined(content).unwrap();
        assert!(analysis.available);
        assert_eq!(analysis.design.primary_cta.as_deref(), Some("Sign up"));
        assert_eq!(analysis.responsiveness.issues.len(), 1);
        assert!(analysis.compliance.cookie_banner_detected);
        assert_eq!(analysis.compliance.score, 70);
    }

    #[test]
    fn test_parse_combined_strips_markdown_fences() {
        let content = "```json\n{\"design\": {}, \"responsiveness\": {}, \"compliance\": {\"score\": 150}}\n```";
        let analysis = parse_combined(content).unwrap();
        assert!(analysis.available);
        // out-of-range model scores are clamped
        assert_eq!(analysis.compliance.score, 100);
    }

    #[test]
    fn test_parse_combined_rejects_garbage() {
        assert!(parse_combined("not json at all").is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_degrades() {
        let service = VisionService {
            api_key: None,
            model: "test".to_string(),
            api_base_url: "http://localhost:9".to_string(),
            client: reqwest::Client::new(),
        };
        let analysis = service.analyze_combined("aGVsbG8=", "https://example.org").await;
        assert!(!analysis.available);
    }
}
