// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod digest;
pub mod driver;
pub mod extract;
pub mod filter;
pub mod ingest;
pub mod job;
pub mod ledger;
pub mod mailbox;
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, ConfigError};
pub use crate::driver::{run_once, LedgerUpdate, RunOptions, RunReport, RunStatus};
pub use crate::filter::FilterPolicy;
pub use crate::job::JobRecord;
pub use crate::ledger::Ledger;

use crate::ingest::providers::{
    indeed_alert::{AlertSearch, IndeedAlertProvider},
    remoteok::{RemoteOkProvider, API_URL},
    wwr_rss::{WwrRssProvider, FEED_URL},
};
use crate::ingest::types::SourceProvider;
use crate::mailbox::imap::ImapConnector;
use crate::notify::{DigestSender, DisabledSender, EmailSender, StdoutSender};

/// The three live providers, in digest order: feed, API, mailbox alerts.
pub fn live_providers(cfg: &AppConfig) -> anyhow::Result<Vec<Box<dyn SourceProvider>>> {
    let client = ingest::http::build_client()?;
    let mailbox = ImapConnector::new(cfg.mailbox.host.clone(), cfg.mailbox.port);
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(WwrRssProvider::from_url(
            client.clone(),
            FEED_URL,
            cfg.filter.clone(),
        )),
        Box::new(RemoteOkProvider::from_url(
            client,
            API_URL,
            cfg.filter.clone(),
        )),
        Box::new(IndeedAlertProvider::new(
            Box::new(mailbox),
            cfg.mailbox.credentials.clone(),
            AlertSearch::from(&cfg.mailbox),
        )),
    ];
    Ok(providers)
}

/// SMTP sender, or stdout when `DRY_RUN=1`. A broken email config only
/// disables the send step; sources are still fetched.
pub fn digest_sender(cfg: &AppConfig) -> Box<dyn DigestSender> {
    if cfg.dry_run {
        return Box::new(StdoutSender);
    }
    match EmailSender::from_config(&cfg.email) {
        Ok(sender) => Box::new(sender),
        Err(e) => {
            tracing::warn!(error = %e, "email sending disabled");
            Box::new(DisabledSender::new(format!("{e:#}")))
        }
    }
}
