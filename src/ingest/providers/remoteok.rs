// src/ingest/providers/remoteok.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::filter::FilterPolicy;
use crate::ingest::http::{get_text, ACCEPT_JSON};
use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;
use crate::job::{JobRecord, REMOTE_LOCATION, UNKNOWN_COMPANY};

pub const SOURCE: &str = "RemoteOK";
pub const API_URL: &str = "https://remoteok.com/api";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Parse the API listing. Element 0 is the legal/legend notice and is skipped.
pub fn parse_listing(body: &str, policy: &FilterPolicy) -> Result<Vec<JobRecord>> {
    let data: Value = serde_json::from_str(body).context("parsing remoteok json")?;
    let items = data
        .as_array()
        .context("remoteok response is not a json array")?;

    let mut out = Vec::new();
    for item in items.iter().skip(1) {
        let Some(obj) = item.as_object() else {
            continue;
        };
        // Non-string values count as absent.
        let field = |key: &str| obj.get(key).and_then(Value::as_str).unwrap_or_default();

        let title = match field("position").trim() {
            "" => field("title").trim(),
            p => p,
        };
        if title.is_empty() {
            continue;
        }
        let company = field("company");
        let location = field("location");
        let description = field("description");

        if !policy.is_allowed(title, company, location, description) {
            continue;
        }

        out.push(JobRecord {
            source: SOURCE.to_string(),
            title: title.to_string(),
            company: or_default(company, UNKNOWN_COMPANY),
            location: or_default(location, REMOTE_LOCATION),
            url: field("url").to_string(),
            summary: normalize_text(description),
        });
    }

    tracing::debug!(
        source = SOURCE,
        total = items.len().saturating_sub(1),
        accepted = out.len(),
        "listing filtered"
    );
    Ok(out)
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

pub struct RemoteOkProvider {
    mode: Mode,
    policy: FilterPolicy,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RemoteOkProvider {
    pub fn from_fixture(json: &str, policy: FilterPolicy) -> Self {
        Self {
            mode: Mode::Fixture(json.to_string()),
            policy,
        }
    }

    pub fn from_url(client: reqwest::Client, url: impl Into<String>, policy: FilterPolicy) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
            policy,
        }
    }
}

#[async_trait]
impl SourceProvider for RemoteOkProvider {
    async fn fetch_latest(&self) -> Result<Vec<JobRecord>> {
        match &self.mode {
            Mode::Fixture(s) => parse_listing(s, &self.policy),
            Mode::Http { url, client } => {
                let body = get_text(client, url, ACCEPT_JSON, FETCH_TIMEOUT).await?;
                parse_listing(&body, &self.policy)
            }
        }
    }

    fn name(&self) -> &'static str {
        SOURCE
    }
}
