// src/digest.rs
use chrono::{DateTime, TimeZone, Utc};

use crate::job::JobRecord;

/// Plain-text digest: keyword line, blank line, then one block per job.
pub fn render_digest(keywords: &[String], jobs: &[JobRecord]) -> String {
    let mut lines = Vec::with_capacity(2 + jobs.len() * 3);
    lines.push(format!("Search keywords: {}", keywords.join(", ")));
    lines.push(String::new());
    for (i, j) in jobs.iter().enumerate() {
        lines.push(format!("{}. [{}] {} - {}", i + 1, j.source, j.title, j.company));
        lines.push(j.url.clone());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// `[Daily Remote Jobs] {count} - {YYYY-MM-DD}`, date taken in `tz`.
pub fn digest_subject<Tz: TimeZone>(count: usize, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let today = now.with_timezone(tz).format("%Y-%m-%d");
    format!("[Daily Remote Jobs] {count} - {today}")
}
