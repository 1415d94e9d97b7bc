// src/mailbox/mod.rs
//! Mailbox access used by the alert provider.

pub mod imap;

use anyhow::Result;
use mailparse::{DispositionType, ParsedMail};

use crate::config::Credentials;

/// An authenticated mailbox session. Callers must `logout` on every path.
#[async_trait::async_trait]
pub trait MailSession: Send {
    async fn select_inbox(&mut self) -> Result<()>;
    /// Message ids matching `query`, ascending (oldest first).
    async fn search(&mut self, query: &str) -> Result<Vec<u32>>;
    /// Full RFC 822 message, `None` when the server returned no body.
    async fn fetch_message(&mut self, id: u32) -> Result<Option<Vec<u8>>>;
    async fn logout(&mut self) -> Result<()>;
}

/// Opens a logged-in session (connect + login).
#[async_trait::async_trait]
pub trait MailboxConnector: Send + Sync {
    async fn open(&self, credentials: &Credentials) -> Result<Box<dyn MailSession>>;
}

/// IMAP search criteria from optional sender/subject substrings.
pub fn search_query(from: &str, subject: &str) -> String {
    let mut parts = Vec::new();
    if !from.trim().is_empty() {
        parts.push(format!("FROM \"{}\"", from.trim()));
    }
    if !subject.trim().is_empty() {
        parts.push(format!("SUBJECT \"{}\"", subject.trim()));
    }
    if parts.is_empty() {
        "ALL".to_string()
    } else {
        parts.join(" ")
    }
}

/// First `text/html` part in depth-first pre-order, skipping attachments.
pub fn first_html_body(mail: &ParsedMail<'_>) -> Option<String> {
    let is_attachment =
        mail.get_content_disposition().disposition == DispositionType::Attachment;
    if !is_attachment && mail.ctype.mimetype.eq_ignore_ascii_case("text/html") {
        match mail.get_body() {
            Ok(body) => return Some(body),
            Err(e) => tracing::debug!(error = %e, "undecodable html part"),
        }
    }
    mail.subparts.iter().find_map(first_html_body)
}

/// Decoded Subject header, empty when absent.
pub fn subject_of(mail: &ParsedMail<'_>) -> String {
    use mailparse::MailHeaderMap;
    mail.headers.get_first_value("Subject").unwrap_or_default()
}
