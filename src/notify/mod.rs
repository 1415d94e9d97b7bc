// src/notify/mod.rs
pub mod email;
pub mod stdout;

use anyhow::{anyhow, Result};

pub use email::EmailSender;
pub use stdout::StdoutSender;

/// Delivers a rendered digest.
#[async_trait::async_trait]
pub trait DigestSender: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Stands in when the real sender could not be configured; every send fails
/// with the configuration error.
#[derive(Debug, Clone)]
pub struct DisabledSender {
    reason: String,
}

impl DisabledSender {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl DigestSender for DisabledSender {
    async fn send(&self, _subject: &str, _body: &str) -> Result<()> {
        Err(anyhow!("sender disabled: {}", self.reason))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
