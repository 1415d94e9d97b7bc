// src/filter.rs
//! Keyword inclusion / exclusion policy shared by the feed and API adapters.

pub const DEFAULT_INCLUDE: &[&str] = &["developer", "engineer"];

pub const DEFAULT_EXCLUDE: &[&str] = &[
    "china",
    "beijing",
    "shanghai",
    "shenzhen",
    "guangzhou",
    "prc",
    "cn",
    "hong kong",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_INCLUDE.iter().copied(),
            DEFAULT_EXCLUDE.iter().copied(),
        )
    }
}

impl FilterPolicy {
    /// Keywords are trimmed and lowercased; blanks are dropped.
    /// An empty include list falls back to `DEFAULT_INCLUDE`.
    pub fn new<I, E, S1, S2>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S1>,
        E: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let mut include = clean_keywords(include);
        if include.is_empty() {
            include = DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect();
        }
        Self {
            include,
            exclude: clean_keywords(exclude),
        }
    }

    /// Include list from a comma-separated string (e.g. `SEARCH_KEYWORDS`),
    /// default exclude list.
    pub fn from_keywords(csv: &str) -> Self {
        Self::new(csv.split(','), DEFAULT_EXCLUDE.iter().copied())
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn matches_keywords(&self, title: &str, description: &str) -> bool {
        contains_any(&format!("{title} {description}"), &self.include)
    }

    pub fn is_excluded(&self, title: &str, company: &str, location: &str, description: &str) -> bool {
        self.excludes_text(&format!("{title} {company} {location} {description}"))
    }

    /// Exclude check over an arbitrary blob.
    pub fn excludes_text(&self, text: &str) -> bool {
        contains_any(text, &self.exclude)
    }

    pub fn is_allowed(&self, title: &str, company: &str, location: &str, description: &str) -> bool {
        !self.is_excluded(title, company, location, description)
            && self.matches_keywords(title, description)
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

fn clean_keywords<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
