//! Remote Jobs Digest: binary entrypoint.
//! Runs one batch (fetch → filter → dedup → send → persist) and exits.

use remote_jobs_digest::{
    digest_sender, live_providers, run_once, AppConfig, RunOptions, RunStatus,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins; otherwise `DEBUG=1` turns on debug output for this crate.
fn init_tracing(debug: bool) {
    let default = if debug {
        "remote_jobs_digest=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env when present; no-op otherwise.
    let _ = dotenvy::dotenv();

    // Config warnings go through a plain stderr logger until DEBUG is known.
    let cfg = tracing::subscriber::with_default(
        tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .finish(),
        AppConfig::from_env,
    );
    init_tracing(cfg.debug);

    let providers = match live_providers(&cfg) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = ?e, "could not set up providers");
            return;
        }
    };
    let sender = digest_sender(&cfg);

    let report = run_once(&providers, sender.as_ref(), &RunOptions::from(&cfg)).await;
    for (source, err) in report.failures() {
        tracing::warn!(source, error = err, "source skipped this run");
    }
    match report.status {
        RunStatus::NoNewJobs => {}
        RunStatus::Sent { count } => tracing::info!(count, "done"),
        RunStatus::SendFailed { count, error } => {
            tracing::error!(count, error = %error, "digest not delivered")
        }
    }
}
