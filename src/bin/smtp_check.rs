//! SMTP connectivity check: sends one test message with the digest's email settings.

use remote_jobs_digest::notify::{DigestSender, EmailSender};
use remote_jobs_digest::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = AppConfig::from_env();
    let sender = EmailSender::from_config(&cfg.email)?;
    sender
        .send("SMTP Test", "Hello, your job script email works.")
        .await?;

    println!("SMTP OK");
    Ok(())
}
