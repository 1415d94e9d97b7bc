// src/ingest/providers/wwr_rss.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::time::Duration;

use crate::filter::FilterPolicy;
use crate::ingest::http::{get_text, ACCEPT_FEED};
use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;
use crate::job::{JobRecord, REMOTE_LOCATION, UNKNOWN_COMPANY};

pub const SOURCE: &str = "WeWorkRemotely";
pub const FEED_URL: &str = "https://weworkremotely.com/remote-jobs.rss";
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

// Only the first few decisions are logged per run.
const DEBUG_SAMPLE: usize = 5;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

// RSS 1.0: items are siblings of the channel under `rdf:RDF`.
#[derive(Debug, Deserialize)]
struct Rdf {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Raw (title, summary, link) triple, format-independent.
struct Entry {
    title: String,
    summary: String,
    link: String,
}

impl From<Item> for Entry {
    fn from(it: Item) -> Self {
        Entry {
            title: it.title.unwrap_or_default(),
            summary: it.description.unwrap_or_default(),
            link: it.link.unwrap_or_default().trim().to_string(),
        }
    }
}

fn parse_entries(xml: &str) -> Result<Vec<Entry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    if xml_clean.contains("<rdf:RDF") {
        let rdf: Rdf = from_str(&xml_clean).context("parsing rdf xml")?;
        Ok(rdf.item.into_iter().map(Entry::from).collect())
    } else if xml_clean.contains("<rss") || xml_clean.contains("<channel") {
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
        if rss.channel.item.is_empty() {
            tracing::debug!(source = SOURCE, "channel has no items");
        }
        Ok(rss.channel.item.into_iter().map(Entry::from).collect())
    } else if xml_clean.contains("<feed") {
        let feed: AtomFeed = from_str(&xml_clean).context("parsing atom xml")?;
        Ok(feed
            .entry
            .into_iter()
            .map(|e| {
                let link = e
                    .link
                    .iter()
                    .find(|l| l.rel.as_deref().unwrap_or("alternate") == "alternate")
                    .or_else(|| e.link.first())
                    .map(|l| l.href.trim().to_string())
                    .unwrap_or_default();
                Entry {
                    title: e.title.map(|t| t.value).unwrap_or_default(),
                    summary: e.summary.or(e.content).map(|t| t.value).unwrap_or_default(),
                    link,
                }
            })
            .collect())
    } else {
        Err(anyhow!("not an rss or atom document"))
    }
}

/// Parse a feed and keep entries that pass `policy`.
///
/// The exclude check runs over `"{title} Remote {summary}"`, mirroring the
/// location every entry of this board is tagged with.
pub fn parse_feed(xml: &str, policy: &FilterPolicy) -> Result<Vec<JobRecord>> {
    let entries = parse_entries(xml)?;

    let total = entries.len();
    let mut rejected_excluded = 0usize;
    let mut rejected_keyword = 0usize;
    let mut out = Vec::with_capacity(total);

    for (idx, e) in entries.into_iter().enumerate() {
        let sample = idx < DEBUG_SAMPLE;
        let title = e.title.trim();
        if title.is_empty() {
            continue;
        }

        if policy.excludes_text(&format!("{title} {REMOTE_LOCATION} {}", e.summary)) {
            rejected_excluded += 1;
            if sample {
                tracing::debug!(source = SOURCE, title, "reject: excluded");
            }
            continue;
        }
        if !policy.matches_keywords(title, &e.summary) {
            rejected_keyword += 1;
            if sample {
                tracing::debug!(source = SOURCE, title, "reject: keyword");
            }
            continue;
        }
        if sample {
            tracing::debug!(source = SOURCE, title, "accept");
        }

        out.push(JobRecord {
            source: SOURCE.to_string(),
            title: title.to_string(),
            company: UNKNOWN_COMPANY.to_string(),
            location: REMOTE_LOCATION.to_string(),
            url: e.link,
            summary: normalize_text(&e.summary),
        });
    }

    tracing::debug!(
        source = SOURCE,
        total,
        accepted = out.len(),
        rejected_excluded,
        rejected_keyword,
        "feed filtered"
    );
    Ok(out)
}

pub struct WwrRssProvider {
    mode: Mode,
    policy: FilterPolicy,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl WwrRssProvider {
    pub fn from_fixture(xml: &str, policy: FilterPolicy) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
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
impl SourceProvider for WwrRssProvider {
    async fn fetch_latest(&self) -> Result<Vec<JobRecord>> {
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s, &self.policy),
            Mode::Http { url, client } => {
                tracing::debug!(source = SOURCE, url = %url, "fetching feed");
                let body = get_text(client, url, ACCEPT_FEED, FETCH_TIMEOUT).await?;
                parse_feed(&body, &self.policy)
            }
        }
    }

    fn name(&self) -> &'static str {
        SOURCE
    }
}

// CDATA sections, then any `&...` run outside them.
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>|&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;?)?")
        .expect("valid entity regex")
});

const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// Named HTML entities are not valid XML. Typographic punctuation is folded
/// to ASCII first; then, outside CDATA, other named entities are decoded and
/// unknown ones or a bare `&` are escaped.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let folded = s
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...");

    ENTITY_RE
        .replace_all(&folded, |caps: &Captures| {
            let whole = &caps[0];
            if whole.starts_with("<![CDATA[") {
                return whole.to_string();
            }
            let Some(rest) = caps.get(1).map(|m| m.as_str()) else {
                return "&amp;".to_string();
            };
            if rest.starts_with('#') {
                return whole.to_string();
            }
            let Some(name) = rest.strip_suffix(';') else {
                return format!("&amp;{rest}");
            };
            if XML_ENTITIES.contains(&name) {
                return whole.to_string();
            }
            let decoded = html_escape::decode_html_entities(whole);
            if decoded == whole {
                format!("&amp;{rest}")
            } else {
                html_escape::encode_text(&decoded).into_owned()
            }
        })
        .into_owned()
}
