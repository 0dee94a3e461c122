// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::analyzers::apply_penalties;
use crate::domain::models::extracted::ExtractedData;
use crate::domain::models::pillar::{PillarName, PillarResult};
use crate::domain::models::vision::VisionAnalysis;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::BTreeSet;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[0-9a-fA-F]{6}\b|#[0-9a-fA-F]{3}\b").expect("valid color regex"));
static RGB_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"rgba?\([^)]{1,40}\)").expect("valid rgb regex"));
static FONT_FAMILY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-family\s*:\s*([^;}{]+)").expect("valid font-family regex"));
static FONT_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"font-size\s*:\s*(\d+(?:\.\d+)?)px").expect("valid font-size regex")
});

/// 设计支柱分析
///
/// 从原始HTML/CSS推导颜色数量、合成对比度估计、字体多样性与
/// 可读性；布局得分在可用时使用性能支柱产出的CLS。所有扣分都
/// 是从100基线出发的累加惩罚，下限为0。视觉结果可用时合并AI
/// 设计评论并追加其建议，否则回退到HTML关键词启发式。
pub fn analyze(data: &ExtractedData, vision: &VisionAnalysis, cls: Option<f64>) -> PillarResult {
    let mut penalties = 0u32;
    let mut recommendations = Vec::new();
    let mut findings = Vec::new();

    // Color palette
    let colors = collect_colors(&data.html);
    if colors.len() > 20 {
        penalties += 10;
        recommendations.push("Reduce the color palette to a consistent set".to_string());
    } else if colors.len() > 12 {
        penalties += 5;
    }
    findings.push(format!("{} distinct color literals", colors.len()));

    // Synthetic contrast estimate over hex luminances
    if let Some(contrast) = estimate_contrast(&colors) {
        findings.push(format!("estimated contrast ratio {:.1}", contrast));
        if contrast < 3.0 {
            penalties += 10;
            recommendations
                .push("Increase contrast between text and background colors".to_string());
        }
    }

    // Font diversity and readability
    let families = collect_font_families(&data.html);
    if families.len() > 5 {
        penalties += 5;
        recommendations.push("Limit the number of font families".to_string());
    }
    let sizes = collect_font_sizes(&data.html);
    if sizes.iter().any(|s| *s < 140) {
        penalties += 10;
        recommendations.push("Avoid font sizes below 14px for body text".to_string());
    }
    if sizes.len() > 8 {
        penalties += 8;
        recommendations.push("Consolidate the font size scale".to_string());
    }
    findings.push(format!(
        "{} font families, {} distinct pixel sizes",
        families.len(),
        sizes.len()
    ));

    // Layout stability from the performance pillar's CLS when present
    if let Some(cls) = cls {
        if cls >= 0.25 {
            penalties += 15;
            recommendations.push("Fix large layout shifts during load".to_string());
        } else if cls >= 0.1 {
            penalties += 8;
            recommendations.push("Reduce layout shifts during load".to_string());
        }
        findings.push(format!("CLS {:.3}", cls));
    }

    // Vision critique or keyword fallback
    if vision.available {
        for issue in &vision.design.issues {
            findings.push(format!("vision: {}", issue));
        }
        if let Some(style) = &vision.design.visual_style {
            findings.push(format!("visual style: {}", style));
        }
        if vision.design.primary_cta.is_none() {
            penalties += 5;
            recommendations.push("Make the primary call to action more prominent".to_string());
        }
        recommendations.extend(vision.design.recommendations.iter().cloned());
    } else {
        let html_lower = data.html.to_lowercase();
        let has_cta = html_lower.contains("<button")
            || html_lower.contains("class=\"btn")
            || html_lower.contains("cta");
        if !has_cta {
            penalties += 5;
            recommendations.push("Add a clear call-to-action button".to_string());
        }
    }

    let score = apply_penalties(penalties);

    PillarResult {
        pillar: PillarName::Design,
        score,
        analyzed: true,
        insights: findings.join("; "),
        recommendations,
        raw: json!({
            "color_count": colors.len(),
            "font_family_count": families.len(),
            "font_size_count": sizes.len(),
            "cls": cls,
            "vision_used": vision.available,
        }),
        error: None,
    }
}

fn collect_colors(html: &str) -> BTreeSet<String> {
    let mut colors = BTreeSet::new();
    for m in HEX_COLOR_RE.find_iter(html) {
        colors.insert(m.as_str().to_lowercase());
    }
    for m in RGB_COLOR_RE.find_iter(html) {
        colors.insert(m.as_str().replace(' ', "").to_lowercase());
    }
    colors
}

/// 由十六进制颜色的相对亮度极值推一个合成对比度
///
/// 不是真实的前景/背景配对分析，只是调色板跨度的粗估。
fn estimate_contrast(colors: &BTreeSet<String>) -> Option<f64> {
    let luminances: Vec<f64> = colors
        .iter()
        .filter_map(|c| hex_luminance(c))
        .collect();
    if luminances.len() < 2 {
        return None;
    }
    let max = luminances.iter().cloned().fold(f64::MIN, f64::max);
    let min = luminances.iter().cloned().fold(f64::MAX, f64::min);
    Some((max + 0.05) / (min + 0.05))
}

fn hex_luminance(color: &str) -> Option<f64> {
    let hex = color.strip_prefix('#')?;
    let (r, g, b) = match hex.len() {
        6 => (
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ),
        3 => {
            let expand = |c: &str| u8::from_str_radix(&format!("{}{}", c, c), 16).ok();
            (
                expand(&hex[0..1])?,
                expand(&hex[1..2])?,
                expand(&hex[2..3])?,
            )
        }
        _ => return None,
    };

    let channel = |v: u8| {
        let v = v as f64 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    Some(0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b))
}

fn collect_font_families(html: &str) -> BTreeSet<String> {
    let mut families = BTreeSet::new();
    for caps in FONT_FAMILY_RE.captures_iter(html) {
        if let Some(list) = caps.get(1) {
            if let Some(first) = list.as_str().split(',').next() {
                let name = first.trim().trim_matches(['"', '\'']).to_lowercase();
                if !name.is_empty() {
                    families.insert(name);
                }
            }
        }
    }
    families
}

/// 提取像素字号集合，以十分之一像素为单位去重
fn collect_font_sizes(html: &str) -> BTreeSet<u32> {
    let mut sizes = BTreeSet::new();
    for caps in FONT_SIZE_RE.captures_iter(html) {
        if let Some(value) = caps.get(1) {
            if let Ok(px) = value.as_str().parse::<f64>() {
                sizes.insert((px * 10.0).round() as u32);
            }
        }
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> ExtractedData {
        ExtractedData {
            html: html.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_page_scores_high() {
        let data = page(
            r#"<html><style>
               body { font-family: Inter, sans-serif; font-size: 16px; color: #111111; background: #ffffff; }
               h1 { font-size: 32px; }
               </style><body><button>Get started</button></body></html>"#,
        );
        let result = analyze(&data, &VisionAnalysis::degraded(), Some(0.02));
        assert!(result.analyzed);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_small_fonts_penalized() {
        let data = page(
            r#"<style>body { font-size: 11px; } .x { font-size: 12px; }</style><button>ok</button>"#,
        );
        let result = analyze(&data, &VisionAnalysis::degraded(), None);
        assert_eq!(result.score, 90);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("font sizes below 14px")));
    }

    #[test]
    fn test_high_cls_penalized() {
        let data = page("<button>ok</button>");
        let with_cls = analyze(&data, &VisionAnalysis::degraded(), Some(0.4));
        let without_cls = analyze(&data, &VisionAnalysis::degraded(), None);
        assert_eq!(without_cls.score - with_cls.score, 15);
    }

    #[test]
    fn test_vision_recommendations_appended() {
        let data = page("<button>ok</button>");
        let mut vision = VisionAnalysis::degraded();
        vision.available = true;
        vision.design.primary_cta = Some("Sign up".to_string());
        vision.design.recommendations = vec!["Use more whitespace around the hero".to_string()];
        let result = analyze(&data, &vision, None);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("whitespace")));
    }

    #[test]
    fn test_font_size_sprawl_penalized() {
        let css: String = (10..20)
            .map(|s| format!(".s{} {{ font-size: {}px; }}", s, s + 14))
            .collect();
        let data = page(&format!("<style>{}</style><button>ok</button>", css));
        let result = analyze(&data, &VisionAnalysis::degraded(), None);
        assert_eq!(result.score, 92);
    }

    #[test]
    fn test_luminance_extremes() {
        assert!(hex_luminance("#ffffff").unwrap() > 0.99);
        assert!(hex_luminance("#000000").unwrap() < 0.01);
        assert!(hex_luminance("#fff").is_some());
        assert!(hex_luminance("#xyz").is_none());
    }
}
