// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 评分支柱枚举
///
/// 七个独立的评分维度，流水线按此顺序依次执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarName {
    /// 性能
    Performance,
    /// 设计
    Design,
    /// 响应式
    Responsiveness,
    /// SEO
    Seo,
    /// 安全
    Security,
    /// 合规
    Compliance,
    /// 分析工具
    Analytics,
}

impl PillarName {
    /// 流水线的固定执行顺序
    pub const ALL: [PillarName; 7] = [
        PillarName::Performance,
        PillarName::Design,
        PillarName::Responsiveness,
        PillarName::Seo,
        PillarName::Security,
        PillarName::Compliance,
        PillarName::Analytics,
    ];
}

impl fmt::Display for PillarName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PillarName::Performance => write!(f, "performance"),
            PillarName::Design => write!(f, "design"),
            PillarName::Responsiveness => write!(f, "responsiveness"),
            PillarName::Seo => write!(f, "seo"),
            PillarName::Security => write!(f, "security"),
            PillarName::Compliance => write!(f, "compliance"),
            PillarName::Analytics => write!(f, "analytics"),
        }
    }
}

impl FromStr for PillarName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "performance" => Ok(PillarName::Performance),
            "design" => Ok(PillarName::Design),
            "responsiveness" => Ok(PillarName::Responsiveness),
            "seo" => Ok(PillarName::Seo),
            "security" => Ok(PillarName::Security),
            "compliance" => Ok(PillarName::Compliance),
            "analytics" => Ok(PillarName::Analytics),
            _ => Err(()),
        }
    }
}

/// 支柱分析结果
///
/// 每个 (请求, 支柱) 组合只产生一条结果记录，插入后不再修改。
/// 分析器内部失败时以 analyzed=false、score=0 的软失败形式返回，
/// 从不向编排器抛出错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarResult {
    /// 所属支柱
    pub pillar: PillarName,
    /// 得分（0-100整数）
    pub score: u32,
    /// 是否成功完成分析
    pub analyzed: bool,
    /// 主要发现的文字摘要
    pub insights: String,
    /// 有序的改进建议列表
    pub recommendations: Vec<String>,
    /// 分析器原始输出
    pub raw: serde_json::Value,
    /// 软失败时的错误说明
    pub error: Option<String>,
}

impl PillarResult {
    /// 构造软失败结果
    ///
    /// 支柱内部依赖失败时使用，保证 analyzed=false 蕴含 score=0。
    pub fn failed(pillar: PillarName, error: impl Into<String>) -> Self {
        Self {
            pillar,
            score: 0,
            analyzed: false,
            insights: String::new(),
            recommendations: Vec::new(),
            raw: serde_json::Value::Null,
            error: Some(error.into()),
        }
    }
}
