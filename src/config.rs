// src/config.rs
//! Process configuration, read once at startup and passed explicitly to every component.

use chrono_tz::Tz;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::filter::FilterPolicy;

pub const DEFAULT_IMAP_HOST: &str = "imap.gmail.com";
pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_ALERT_FROM: &str = "indeed";
pub const DEFAULT_ALERT_SUBJECT: &str = "Job Alert";
pub const DEFAULT_ALERT_MAX_MESSAGES: usize = 5;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Dubai;
pub const DEFAULT_LEDGER_PATH: &str = "sent_jobs.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing {what} credentials")]
    MissingCredentials { what: &'static str },
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
    pub from_filter: String,
    pub subject_filter: String,
    pub max_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
    pub to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mailbox: MailboxConfig,
    pub email: EmailConfig,
    pub debug: bool,
    pub dry_run: bool,
    pub timezone: Tz,
    pub ledger_path: PathBuf,
    pub filter: FilterPolicy,
}

impl AppConfig {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| map.get(key).cloned())
    }

    /// Build from any key lookup. Invalid numbers and unknown zones fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let mailbox = MailboxConfig {
            host: get("GMAIL_IMAP_HOST")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAP_HOST.to_string()),
            port: parse_or("GMAIL_IMAP_PORT", get("GMAIL_IMAP_PORT"), DEFAULT_IMAP_PORT),
            credentials: credentials(get("INDEED_USER"), lookup("INDEED_PASS")),
            from_filter: get("INDEED_FROM").unwrap_or_else(|| DEFAULT_ALERT_FROM.to_string()),
            subject_filter: get("INDEED_SUBJECT")
                .unwrap_or_else(|| DEFAULT_ALERT_SUBJECT.to_string()),
            max_messages: parse_or(
                "INDEED_MAX_EMAILS",
                get("INDEED_MAX_EMAILS"),
                DEFAULT_ALERT_MAX_MESSAGES,
            ),
        };

        let email_user = get("EMAIL_USER").filter(|v| !v.is_empty());
        let email = EmailConfig {
            host: get("EMAIL_HOST")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: parse_or("EMAIL_PORT", get("EMAIL_PORT"), DEFAULT_SMTP_PORT),
            credentials: credentials(email_user.clone(), lookup("EMAIL_PASS")),
            to: get("EMAIL_TO").filter(|v| !v.is_empty()).or(email_user),
        };

        let timezone = match get("TIMEZONE").filter(|v| !v.is_empty()) {
            None => DEFAULT_TIMEZONE,
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(timezone = %name, "unknown time zone, using default");
                DEFAULT_TIMEZONE
            }),
        };

        Self {
            mailbox,
            email,
            debug: flag(get("DEBUG")),
            dry_run: flag(get("DRY_RUN")),
            timezone,
            ledger_path: get("SENT_CACHE_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
            filter: FilterPolicy::from_keywords(&get("SEARCH_KEYWORDS").unwrap_or_default()),
        }
    }
}

fn flag(raw: Option<String>) -> bool {
    raw.as_deref() == Some("1")
}

fn credentials(user: Option<String>, password: Option<String>) -> Option<Credentials> {
    match (user, password) {
        (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
            Some(Credentials { user, password })
        }
        _ => None,
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> T {
    match raw.filter(|v| !v.is_empty()) {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!("{}", ConfigError::Invalid { key, value: v });
            default
        }),
    }
}
