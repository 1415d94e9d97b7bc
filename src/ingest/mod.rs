// src/ingest/mod.rs
pub mod http;
pub mod providers;
pub mod types;

use crate::ingest::types::{FetchOutcome, SourceProvider};
use once_cell::sync::OnceCell;
use regex::Regex;

const SUMMARY_MAX_CHARS: usize = 1500;

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Normalize an HTML-ish description into plain text: decode entities,
/// strip tags, collapse whitespace, cap the length.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    // Tags become spaces so "<li>a</li><li>b</li>" stays two words.
    let stripped = re_tags.replace_all(&decoded, " ");

    let mut out = collapse_whitespace(&stripped);
    if out.chars().count() > SUMMARY_MAX_CHARS {
        out = out.chars().take(SUMMARY_MAX_CHARS).collect();
    }
    out
}

/// Call every provider in order. A failing provider yields an outcome with no
/// jobs and the error text; it never stops the others.
pub async fn collect_all(providers: &[Box<dyn SourceProvider>]) -> Vec<FetchOutcome> {
    let mut outcomes = Vec::with_capacity(providers.len());
    for p in providers {
        let outcome = match p.fetch_latest().await {
            Ok(jobs) => {
                tracing::info!(source = p.name(), jobs = jobs.len(), "provider done");
                FetchOutcome {
                    source: p.name(),
                    jobs,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = p.name(), "provider error");
                FetchOutcome {
                    source: p.name(),
                    jobs: Vec::new(),
                    error: Some(format!("{e:#}")),
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}
