// src/job.rs
//! Canonical job record every source normalizes into.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_COMPANY: &str = "Unknown";
pub const REMOTE_LOCATION: &str = "Remote";
pub const REMOTE_UNKNOWN_LOCATION: &str = "Remote/Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    pub source: String, // e.g., "WeWorkRemotely", "RemoteOK", "Indeed(Alert)"
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String, // may be empty
    #[serde(default)]
    pub summary: String,
}

impl JobRecord {
    /// Key tracked by the ledger: the url when present, otherwise
    /// `source::title::company`. No normalization is applied.
    pub fn identity_key(&self) -> String {
        if self.url.is_empty() {
            format!("{}::{}::{}", self.source, self.title, self.company)
        } else {
            self.url.clone()
        }
    }
}
