// src/ingest/providers/indeed_alert.rs
//! Job alerts delivered by email, read from the mailbox.
//!
//! Unlike the feed and API providers this one does not apply the
//! `FilterPolicy`: alerts are already narrowed by the alert's own search
//! criteria, and every extracted link is passed through as-is.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::{ConfigError, Credentials, MailboxConfig};
use crate::extract::{BrandLinkExtractor, LinkExtractor, INDEED_ALERT_SOURCE};
use crate::ingest::types::SourceProvider;
use crate::job::JobRecord;
use crate::mailbox::{first_html_body, search_query, subject_of, MailSession, MailboxConnector};

pub const SOURCE: &str = INDEED_ALERT_SOURCE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSearch {
    pub from: String,
    pub subject: String,
    pub max_messages: usize,
}

impl From<&MailboxConfig> for AlertSearch {
    fn from(cfg: &MailboxConfig) -> Self {
        Self {
            from: cfg.from_filter.clone(),
            subject: cfg.subject_filter.clone(),
            max_messages: cfg.max_messages,
        }
    }
}

pub struct IndeedAlertProvider {
    connector: Box<dyn MailboxConnector>,
    credentials: Option<Credentials>,
    search: AlertSearch,
    extractor: Box<dyn LinkExtractor>,
}

impl IndeedAlertProvider {
    pub fn new(
        connector: Box<dyn MailboxConnector>,
        credentials: Option<Credentials>,
        search: AlertSearch,
    ) -> Self {
        Self {
            connector,
            credentials,
            search,
            extractor: Box::new(BrandLinkExtractor::default()),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    async fn read_alerts(&self, session: &mut dyn MailSession) -> Result<Vec<JobRecord>> {
        session.select_inbox().await?;

        let query = search_query(&self.search.from, &self.search.subject);
        let ids = session.search(&query).await?;
        if ids.is_empty() {
            tracing::debug!(source = SOURCE, query = %query, "no alert messages");
            return Ok(Vec::new());
        }

        // Ids are oldest first; keep the most recent N.
        let start = ids.len().saturating_sub(self.search.max_messages);
        let recent = &ids[start..];
        tracing::debug!(source = SOURCE, matched = ids.len(), reading = recent.len(), "alert messages");

        let mut jobs = Vec::new();
        for &id in recent {
            let raw = match session.fetch_message(id).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(error = ?e, source = SOURCE, id, "fetch failed, skipping");
                    continue;
                }
            };
            let mail = match mailparse::parse_mail(&raw) {
                Ok(mail) => mail,
                Err(e) => {
                    tracing::warn!(error = %e, source = SOURCE, id, "unparsable message, skipping");
                    continue;
                }
            };
            let Some(html) = first_html_body(&mail) else {
                tracing::debug!(source = SOURCE, id, "no html part");
                continue;
            };

            let found = self.extractor.extract(&html);
            tracing::debug!(
                source = SOURCE,
                id,
                subject = %subject_of(&mail),
                jobs = found.len(),
                "alert parsed"
            );
            jobs.extend(found);
        }

        Ok(jobs)
    }
}

#[async_trait]
impl SourceProvider for IndeedAlertProvider {
    async fn fetch_latest(&self) -> Result<Vec<JobRecord>> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ConfigError::MissingCredentials { what: "mailbox" })?;

        let mut session = self
            .connector
            .open(credentials)
            .await
            .context("opening mailbox")?;

        let result = self.read_alerts(session.as_mut()).await;

        if let Err(e) = session.logout().await {
            tracing::warn!(error = ?e, source = SOURCE, "logout failed");
        }
        result
    }

    fn name(&self) -> &'static str {
        SOURCE
    }
}
