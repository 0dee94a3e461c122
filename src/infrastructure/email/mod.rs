// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SmtpSettings;
use crate::domain::services::notification::{EmailMessage, EmailSender};
use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP邮件发送器
///
/// 通知是分析结果的附属产物：发送失败只记录日志并返回false，
/// 绝不向调用方抛出错误，避免掩盖流水线本身的结果。
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// 根据SMTP配置构建发送器
    ///
    /// 未配置用户名/密码时走无认证连接（本地开发用的maildev等）。
    pub fn new(settings: &SmtpSettings) -> Result<Self, lettre::transport::smtp::Error> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
                .port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.clone(),
            ));
        } else {
            builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port);
        }

        Ok(Self {
            transport: builder.build(),
            from: settings.from.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> bool {
        let parsed = Message::builder()
            .from(match self.from.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    tracing::error!("Invalid sender address {}: {}", self.from, e);
                    return false;
                }
            })
            .to(match to.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    tracing::error!("Invalid recipient address {}: {}", to, e);
                    return false;
                }
            })
            .subject(&message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ));

        let email = match parsed {
            Ok(email) => email,
            Err(e) => {
                tracing::error!("Failed to build notification email: {}", e);
                return false;
            }
        };

        match self.transport.send(email).await {
            Ok(_) => {
                tracing::info!("Notification email sent to {}", to);
                true
            }
            Err(e) => {
                tracing::error!("Failed to send notification email to {}: {}", to, e);
                false
            }
        }
    }
}
