use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use remote_jobs_digest::config::Credentials;
use remote_jobs_digest::extract::BrandLinkExtractor;
use remote_jobs_digest::ingest::providers::indeed_alert::{AlertSearch, IndeedAlertProvider};
use remote_jobs_digest::ingest::types::SourceProvider;
use remote_jobs_digest::mailbox::{MailSession, MailboxConnector};
use remote_jobs_digest::ConfigError;

const ALERT_EML: &str = include_str!("fixtures/indeed_alert.eml");

#[derive(Default)]
struct Calls {
    log: Vec<String>,
}

/// Scripted mailbox: fixed search result, per-id message bodies.
#[derive(Clone)]
struct FakeMailbox {
    calls: Arc<Mutex<Calls>>,
    ids: Vec<u32>,
    messages: HashMap<u32, Option<Vec<u8>>>,
    fail_select: bool,
    fail_search: bool,
    fail_login: bool,
}

impl FakeMailbox {
    fn new(ids: Vec<u32>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Calls::default())),
            ids,
            messages: HashMap::new(),
            fail_select: false,
            fail_search: false,
            fail_login: false,
        }
    }

    fn with_message(mut self, id: u32, raw: &str) -> Self {
        self.messages.insert(id, Some(raw.as_bytes().to_vec()));
        self
    }

    fn log(&self) -> Vec<String> {
        self.calls.lock().unwrap().log.clone()
    }

    fn record(&self, s: String) {
        self.calls.lock().unwrap().log.push(s);
    }
}

#[async_trait]
impl MailboxConnector for FakeMailbox {
    async fn open(&self, credentials: &Credentials) -> Result<Box<dyn MailSession>> {
        self.record(format!("login {}", credentials.user));
        if self.fail_login {
            return Err(anyhow!("auth failed"));
        }
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl MailSession for FakeMailbox {
    async fn select_inbox(&mut self) -> Result<()> {
        self.record("select".into());
        if self.fail_select {
            return Err(anyhow!("no inbox"));
        }
        Ok(())
    }

    async fn search(&mut self, query: &str) -> Result<Vec<u32>> {
        self.record(format!("search {query}"));
        if self.fail_search {
            return Err(anyhow!("search rejected"));
        }
        Ok(self.ids.clone())
    }

    async fn fetch_message(&mut self, id: u32) -> Result<Option<Vec<u8>>> {
        self.record(format!("fetch {id}"));
        match self.messages.get(&id) {
            Some(m) => Ok(m.clone()),
            None => Err(anyhow!("fetch {id} failed")),
        }
    }

    async fn logout(&mut self) -> Result<()> {
        self.record("logout".into());
        Ok(())
    }
}

fn creds() -> Option<Credentials> {
    Some(Credentials {
        user: "me@example.com".into(),
        password: "app-password".into(),
    })
}

fn search(max: usize) -> AlertSearch {
    AlertSearch {
        from: "indeed".into(),
        subject: "Job Alert".into(),
        max_messages: max,
    }
}

fn provider(mailbox: &FakeMailbox, max: usize) -> IndeedAlertProvider {
    IndeedAlertProvider::new(Box::new(mailbox.clone()), creds(), search(max))
}

#[tokio::test]
async fn alert_email_yields_jobs_and_logs_out() {
    let mailbox = FakeMailbox::new(vec![7]).with_message(7, ALERT_EML);
    let jobs = provider(&mailbox, 5).fetch_latest().await.unwrap();

    let titles: Vec<&str> = jobs.iter().map(|j| j.title.as_str()).collect();
    // The twitter link embeds the brand too: the heuristic keeps it.
    assert_eq!(
        titles,
        vec![
            "Senior Rust Developer",
            "Backend Engineer (Remote)",
            "Follow us on Twitter"
        ]
    );
    assert_eq!(jobs[0].url, "https://click.indeed.com/rc/clk?jk=aaa");
    assert!(jobs.iter().all(|j| j.source == "Indeed(Alert)"));
    assert!(jobs.iter().all(|j| j.location == "Remote/Unknown"));

    assert_eq!(
        mailbox.log(),
        vec![
            "login me@example.com",
            "select",
            r#"search FROM "indeed" SUBJECT "Job Alert""#,
            "fetch 7",
            "logout"
        ]
    );
}

#[tokio::test]
async fn filter_policy_is_not_applied_to_alerts() {
    let html = "Content-Type: text/html\r\n\r\n\
        <a href=\"https://indeed.com/j/1\">Chef de cuisine in Beijing</a>\r\n";
    let mailbox = FakeMailbox::new(vec![1]).with_message(1, html);
    let jobs = provider(&mailbox, 5).fetch_latest().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Chef de cuisine in Beijing");
}

#[tokio::test]
async fn only_the_most_recent_messages_are_read() {
    let mailbox = FakeMailbox::new(vec![1, 2, 3, 4, 5, 6])
        .with_message(5, ALERT_EML)
        .with_message(6, ALERT_EML);
    let jobs = provider(&mailbox, 2).fetch_latest().await.unwrap();
    // Same alert twice: duplicates across messages are left for the driver.
    assert_eq!(jobs.len(), 6);

    let fetched: Vec<String> = mailbox
        .log()
        .into_iter()
        .filter(|l| l.starts_with("fetch"))
        .collect();
    assert_eq!(fetched, vec!["fetch 5", "fetch 6"]);
}

#[tokio::test]
async fn failed_or_html_less_messages_are_skipped() {
    let plain = "Content-Type: text/plain\r\n\r\nno html here\r\n";
    let mut mailbox = FakeMailbox::new(vec![1, 2, 3, 4])
        .with_message(2, plain)
        .with_message(4, ALERT_EML);
    mailbox.messages.insert(3, None);
    // 1 has no message at all -> fetch error.
    let jobs = provider(&mailbox, 10).fetch_latest().await.unwrap();
    assert_eq!(jobs.len(), 3);
    assert_eq!(mailbox.log().last().map(String::as_str), Some("logout"));
}

#[tokio::test]
async fn empty_search_logs_out_early() {
    let mailbox = FakeMailbox::new(vec![]);
    let jobs = provider(&mailbox, 5).fetch_latest().await.unwrap();
    assert!(jobs.is_empty());
    let log = mailbox.log();
    assert_eq!(log.last().map(String::as_str), Some("logout"));
    assert!(!log.iter().any(|l| l.starts_with("fetch")));
}

#[tokio::test]
async fn search_failure_is_reported_and_logs_out() {
    let mut mailbox = FakeMailbox::new(vec![1]);
    mailbox.fail_search = true;
    let err = provider(&mailbox, 5).fetch_latest().await.unwrap_err();
    assert!(format!("{err:#}").contains("search rejected"));
    assert_eq!(mailbox.log().last().map(String::as_str), Some("logout"));
}

#[tokio::test]
async fn select_failure_still_logs_out() {
    let mut mailbox = FakeMailbox::new(vec![1]);
    mailbox.fail_select = true;
    assert!(provider(&mailbox, 5).fetch_latest().await.is_err());
    assert_eq!(mailbox.log(), vec!["login me@example.com", "select", "logout"]);
}

#[tokio::test]
async fn login_failure_is_an_error() {
    let mut mailbox = FakeMailbox::new(vec![1]);
    mailbox.fail_login = true;
    let err = provider(&mailbox, 5).fetch_latest().await.unwrap_err();
    assert!(format!("{err:#}").contains("auth failed"));
}

#[tokio::test]
async fn missing_credentials_is_a_config_error() {
    let mailbox = FakeMailbox::new(vec![1]);
    let p = IndeedAlertProvider::new(Box::new(mailbox.clone()), None, search(5));
    let err = p.fetch_latest().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::MissingCredentials { what: "mailbox" })
    );
    assert!(mailbox.log().is_empty());
}

#[tokio::test]
async fn no_filters_searches_all_and_zero_reads_nothing() {
    let mailbox = FakeMailbox::new(vec![1]).with_message(1, ALERT_EML);
    let p = IndeedAlertProvider::new(
        Box::new(mailbox.clone()),
        creds(),
        AlertSearch {
            from: String::new(),
            subject: " ".into(),
            max_messages: 0,
        },
    );
    assert!(p.fetch_latest().await.unwrap().is_empty());
    assert!(mailbox.log().contains(&"search ALL".to_string()));
}

#[tokio::test]
async fn extractor_is_swappable() {
    let mailbox = FakeMailbox::new(vec![1]).with_message(1, ALERT_EML);
    let p = provider(&mailbox, 5)
        .with_extractor(Box::new(BrandLinkExtractor::new("click.indeed.com", "Indeed(Click)")));
    let jobs = p.fetch_latest().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].source, "Indeed(Click)");
}
