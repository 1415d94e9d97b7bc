// src/driver.rs
//! One batch: collect from every provider, drop jobs already in the ledger,
//! send a digest of what is left, then persist the ledger.

use chrono::Utc;
use chrono_tz::Tz;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::digest::{digest_subject, render_digest};
use crate::ingest::collect_all;
use crate::ingest::types::{FetchOutcome, SourceProvider};
use crate::job::JobRecord;
use crate::ledger::Ledger;
use crate::notify::DigestSender;

pub const NO_NEW_JOBS: &str = "No new jobs.";

/// When the ledger is updated relative to the send result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// Only after a successful send; failed sends are retried next run.
    #[default]
    OnSuccess,
    /// After every send attempt, even a failed one.
    Always,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ledger_path: PathBuf,
    pub keywords: Vec<String>,
    pub timezone: Tz,
    pub ledger_update: LedgerUpdate,
}

impl From<&AppConfig> for RunOptions {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            ledger_path: cfg.ledger_path.clone(),
            keywords: cfg.filter.include().to_vec(),
            timezone: cfg.timezone,
            ledger_update: LedgerUpdate::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    NoNewJobs,
    Sent { count: usize },
    SendFailed { count: usize, error: String },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<FetchOutcome>,
    pub new_jobs: Vec<JobRecord>,
    pub status: RunStatus,
    /// Set when the ledger could not be written after the send step.
    pub ledger_error: Option<String>,
}

impl RunReport {
    /// Diagnostics of providers that failed this run.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error.as_deref().map(|e| (o.source, e)))
    }
}

/// Keep the first record per identity key whose key is not in the ledger.
/// Returns the records with their keys, in input order.
pub fn select_new(jobs: Vec<JobRecord>, ledger: &Ledger) -> Vec<(String, JobRecord)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for job in jobs {
        let key = job.identity_key();
        if ledger.contains(&key) || !seen.insert(key.clone()) {
            continue;
        }
        out.push((key, job));
    }
    out
}

pub async fn run_once(
    providers: &[Box<dyn SourceProvider>],
    sender: &dyn DigestSender,
    opts: &RunOptions,
) -> RunReport {
    let mut ledger = Ledger::load(&opts.ledger_path);

    let outcomes = collect_all(providers).await;
    let all: Vec<JobRecord> = outcomes.iter().flat_map(|o| o.jobs.iter().cloned()).collect();
    let total = all.len();

    let fresh = select_new(all, &ledger);
    tracing::info!(
        total,
        new = fresh.len(),
        known = ledger.len(),
        "jobs merged"
    );

    if fresh.is_empty() {
        println!("{NO_NEW_JOBS}");
        return RunReport {
            outcomes,
            new_jobs: Vec::new(),
            status: RunStatus::NoNewJobs,
            ledger_error: None,
        };
    }

    let (keys, new_jobs): (Vec<String>, Vec<JobRecord>) = fresh.into_iter().unzip();
    let count = new_jobs.len();
    let body = render_digest(&opts.keywords, &new_jobs);
    let subject = digest_subject(count, Utc::now(), &opts.timezone);

    let status = match sender.send(&subject, &body).await {
        Ok(()) => RunStatus::Sent { count },
        Err(e) => {
            tracing::error!(error = ?e, sender = sender.name(), "digest send failed");
            RunStatus::SendFailed {
                count,
                error: format!("{e:#}"),
            }
        }
    };

    let update = matches!(status, RunStatus::Sent { .. })
        || opts.ledger_update == LedgerUpdate::Always;
    let mut ledger_error = None;
    if update {
        for k in keys {
            ledger.insert(k);
        }
        if let Err(e) = ledger.save() {
            tracing::error!(path = %ledger.path().display(), error = ?e, "ledger not saved");
            ledger_error = Some(format!("{e:#}"));
        }
    } else {
        tracing::warn!("ledger left unchanged; these jobs will be retried next run");
    }

    RunReport {
        outcomes,
        new_jobs,
        status,
        ledger_error,
    }
}
