// src/notify/stdout.rs
use anyhow::Result;

use super::DigestSender;

/// Dry-run sink: prints the digest instead of mailing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSender;

#[async_trait::async_trait]
impl DigestSender for StdoutSender {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        println!("Subject: {subject}\n\n{body}");
        tracing::info!(subject, "digest printed (dry run)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
