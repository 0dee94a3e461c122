// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 视觉分析结果
///
/// 单次多模态调用的结果，扇出为三个支柱形状的子结果。
/// 一次调用替代三次独立调用是刻意的成本取舍。
/// 调用失败时返回降级默认值（available=false），下游支柱
/// 必须以与视觉结果缺席完全相同的方式处理。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisionAnalysis {
    /// 视觉结果是否可用；false表示调用失败或未配置
    pub available: bool,
    /// 设计支柱视图
    pub design: VisionDesign,
    /// 响应式支柱视图
    pub responsiveness: VisionResponsiveness,
    /// 合规支柱视图
    pub compliance: VisionCompliance,
}

impl VisionAnalysis {
    /// 降级默认结果
    ///
    /// 所有字段为 unknown / 零置信度，从不代替错误向上传播。
    pub fn degraded() -> Self {
        Self::default()
    }
}

/// 视觉分析的设计视图
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VisionDesign {
    /// 主要行动号召按钮描述
    pub primary_cta: Option<String>,
    /// 视觉风格标签（如 "modern"、"dated"）
    pub visual_style: Option<String>,
    /// 发现的设计问题
    pub issues: Vec<String>,
    /// 改进建议
    pub recommendations: Vec<String>,
}

/// 视觉分析的响应式视图
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VisionResponsiveness {
    /// 观察到的布局问题文字描述（不影响数值评分）
    pub issues: Vec<String>,
}

/// 视觉分析的合规视图
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VisionCompliance {
    /// 是否检测到Cookie同意横幅
    pub cookie_banner_detected: bool,
    /// 是否检测到隐私政策链接
    pub privacy_link_detected: bool,
    /// 视觉评估得分（0-100），用于与文本评分取最大值
    pub score: u32,
    /// 置信度（0.0-1.0）
    pub confidence: f64,
    /// 改进建议
    pub recommendations: Vec<String>,
}
