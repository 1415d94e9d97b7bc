// src/extract.rs
//! Job link extraction from alert email HTML.
//!
//! Alert providers route every job link through their own tracking/redirect
//! hosts, so a single brand substring in the href is enough to tell job links
//! from footer/social links. The heuristic sits behind [`LinkExtractor`] so a
//! stricter strategy (e.g. a domain allowlist) can replace it.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::ingest::collapse_whitespace;
use crate::job::{JobRecord, REMOTE_UNKNOWN_LOCATION, UNKNOWN_COMPANY};

pub const INDEED_BRAND: &str = "indeed";
pub const INDEED_ALERT_SOURCE: &str = "Indeed(Alert)";

/// Anchors with shorter text are icons, "Apply", empty labels.
pub const MIN_TITLE_CHARS: usize = 6;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

pub trait LinkExtractor: Send + Sync {
    /// Extract job records from one HTML document, in document order.
    fn extract(&self, html: &str) -> Vec<JobRecord>;
}

#[derive(Debug, Clone)]
pub struct BrandLinkExtractor {
    brand: String,
    source: String,
}

impl Default for BrandLinkExtractor {
    fn default() -> Self {
        Self::new(INDEED_BRAND, INDEED_ALERT_SOURCE)
    }
}

impl BrandLinkExtractor {
    pub fn new(brand: &str, source: &str) -> Self {
        Self {
            brand: brand.to_lowercase(),
            source: source.to_string(),
        }
    }

    fn looks_like_job_link(&self, href: &str) -> bool {
        !href.is_empty() && href.to_lowercase().contains(&self.brand)
    }
}

impl LinkExtractor for BrandLinkExtractor {
    fn extract(&self, html: &str) -> Vec<JobRecord> {
        let document = Html::parse_document(html);
        let mut seen: HashSet<String> = HashSet::new();
        let mut jobs = Vec::new();

        for a in document.select(&ANCHOR) {
            let href = a.value().attr("href").unwrap_or_default().trim();
            if !self.looks_like_job_link(href) {
                continue;
            }
            // Marked seen even if the text turns out too short.
            if !seen.insert(href.to_string()) {
                continue;
            }

            let text = collapse_whitespace(&a.text().collect::<Vec<_>>().join(" "));
            if text.chars().count() < MIN_TITLE_CHARS {
                continue;
            }

            jobs.push(JobRecord {
                source: self.source.clone(),
                title: text,
                company: UNKNOWN_COMPANY.to_string(),
                location: REMOTE_UNKNOWN_LOCATION.to_string(),
                url: href.to_string(),
                summary: String::new(),
            });
        }

        jobs
    }
}
