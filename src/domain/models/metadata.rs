// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 分析元数据
///
/// 每个请求对应一行，提交时创建，之后在两个时间点更新：
/// 提取完成后写入快照，聚合完成后写入总分与耗时。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// 所属请求ID
    pub request_id: Uuid,
    /// 提取快照（尽力持久化，不含HTML正文与截图）
    pub extracted: Option<serde_json::Value>,
    /// 最终聚合得分
    pub overall_score: Option<u32>,
    /// 流水线总墙钟耗时（毫秒）
    pub duration_ms: Option<i64>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}
