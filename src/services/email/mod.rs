//! 邮件发送
//!
//! `EmailSender` 是唯一出口。配置了 SMTP 时用 lettre 发送，否则只写日志。

mod log_sender;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmailConfig;
use crate::errors::Result;

pub use log_sender::LogEmailSender;
pub use smtp::SmtpEmailSender;

/// 一封纯文本邮件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// 根据配置选择实现；SMTP 初始化失败时退回日志实现
pub fn build_email_sender(config: &EmailConfig) -> Arc<dyn EmailSender> {
    if config.smtp_host.trim().is_empty() {
        tracing::warn!("SMTP host not configured, emails will only be logged");
        return Arc::new(LogEmailSender);
    }

    match SmtpEmailSender::new(config) {
        Ok(sender) => Arc::new(sender),
        Err(e) => {
            tracing::error!("Failed to initialize SMTP transport: {}, falling back to log sender", e);
            Arc::new(LogEmailSender)
        }
    }
}

/// 发送并吞掉错误：通知类邮件失败只记日志
pub async fn send_logged(sender: &dyn EmailSender, message: &EmailMessage) -> bool {
    match sender.send(message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                to = %message.to,
                subject = %message.subject,
                "Email delivery failed: {}",
                e
            );
            false
        }
    }
}
