// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use std::time::Duration;

use super::DigestSender;
use crate::config::{ConfigError, EmailConfig};

const SMTP_TIMEOUT: Duration = Duration::from_secs(20);

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// STARTTLS relay on the configured host/port. Fails without credentials.
    pub fn from_config(cfg: &EmailConfig) -> Result<Self> {
        let creds = cfg
            .credentials
            .as_ref()
            .ok_or(ConfigError::MissingCredentials { what: "email" })?;
        let to_addr = cfg.to.as_deref().unwrap_or(&creds.user);

        let from: Mailbox = creds.user.parse().map_err(|_| ConfigError::Invalid {
            key: "EMAIL_USER",
            value: creds.user.clone(),
        })?;
        let to: Mailbox = to_addr.parse().map_err(|_| ConfigError::Invalid {
            key: "EMAIL_TO",
            value: to_addr.to_string(),
        })?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .with_context(|| format!("smtp relay {}", cfg.host))?
            .port(cfg.port)
            .timeout(Some(SMTP_TIMEOUT))
            .credentials(Credentials::new(creds.user.clone(), creds.password.clone()))
            .build();

        Ok(Self { mailer, from, to })
    }
}

/// Plain-text digest wrapped in a multipart/mixed envelope.
pub fn build_message(from: Mailbox, to: Mailbox, subject: &str, body: &str) -> Result<Message> {
    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(MultiPart::mixed().singlepart(SinglePart::plain(body.to_string())))
        .context("build email")
}

#[async_trait::async_trait]
impl DigestSender for EmailSender {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let msg = build_message(self.from.clone(), self.to.clone(), subject, body)?;
        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(to = %self.to, subject, "digest sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
