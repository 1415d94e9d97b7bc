// src/ingest/types.rs
use anyhow::Result;

use crate::job::JobRecord;

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<JobRecord>>;
    fn name(&self) -> &'static str;
}

/// Result of one provider call within a run. `error` carries the diagnostic
/// when the provider failed; `jobs` is then empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub source: &'static str,
    pub jobs: Vec<JobRecord>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
