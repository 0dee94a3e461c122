// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 分析请求实体
///
/// 表示一次网站审计的提交记录。每个邮箱地址只允许存在一条
/// 请求记录，请求创建后仅通过状态转换被修改，从不删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// 请求唯一标识符
    pub id: Uuid,
    /// 目标URL（已规范化）
    pub url: String,
    /// 提交者邮箱（小写，全局唯一）
    pub email: String,
    /// 请求状态，跟踪请求在其生命周期中的当前阶段
    pub status: RequestStatus,
    /// 失败时记录的错误信息
    pub error_message: Option<String>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 完成时间（成功或失败时写入）
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 请求状态枚举
///
/// 状态转换遵循以下流程：
/// Pending -> Processing -> Completed / Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// 已提交，等待处理
    #[default]
    Pending,
    /// 分析流水线正在执行
    Processing,
    /// 全部支柱分析完成
    Completed,
    /// 流水线因不可恢复错误终止
    Failed,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Processing => write!(f, "processing"),
            RequestStatus::Completed => write!(f, "completed"),
            RequestStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "processing" => Ok(RequestStatus::Processing),
            "completed" => Ok(RequestStatus::Completed),
            "failed" => Ok(RequestStatus::Failed),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Processing,
            RequestStatus::Completed,
            RequestStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<RequestStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_from_unknown() {
        assert!("cancelled".parse::<RequestStatus>().is_err());
    }
}
