// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

/// 待发送的邮件内容
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 邮件主题
    pub subject: String,
    /// HTML正文
    pub html: String,
    /// 纯文本正文
    pub text: String,
}

/// 邮件发送特质
///
/// 外部协作者的窄接口。实现必须从不抛错：发送失败时记录日志
/// 并返回false，保证通知失败永远不会掩盖分析本身的结果。
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送邮件，返回是否成功
    async fn send(&self, to: &str, message: &EmailMessage) -> bool;
}
