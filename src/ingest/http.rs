// src/ingest/http.rs
//! Shared HTTP client for the feed and API providers.

use anyhow::{Context, Result};
use std::time::Duration;

// Some job boards reject non-browser agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const ACCEPT_FEED: &str = "application/rss+xml,application/xml;q=0.9,*/*;q=0.8";
pub const ACCEPT_JSON: &str = "application/json,*/*;q=0.8";

pub fn build_client() -> Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
    );
    reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()
        .context("building http client")
}

/// GET `url` and return the body as text. Non-2xx statuses are errors.
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    accept: &'static str,
    timeout: Duration,
) -> Result<String> {
    let resp = client
        .get(url)
        .header(reqwest::header::ACCEPT, accept)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = resp.status();
    let body = resp
        .error_for_status()
        .with_context(|| format!("GET {url} returned {status}"))?
        .text()
        .await
        .with_context(|| format!("reading body of {url}"))?;

    tracing::debug!(url, %status, bytes = body.len(), "http fetch done");
    Ok(body)
}
