use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, EmailSender};
use crate::errors::Result;

/// 只写日志的发送器（未配置 SMTP 时使用）
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "Email (not sent, SMTP disabled)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
