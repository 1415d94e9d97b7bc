// src/ledger.rs
//! Persisted set of identity keys of jobs already sent.
//!
//! Stored as a pretty-printed, sorted JSON array of strings so the file diffs
//! cleanly between runs. A missing or unreadable file means "nothing sent yet".
//! The set only grows.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    path: PathBuf,
    keys: BTreeSet<String>,
}

impl Ledger {
    /// Never fails: absent or corrupt files yield an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let keys = match fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str::<Vec<String>>(&s) {
                Ok(v) => v.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt ledger, starting empty");
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable ledger, starting empty");
                BTreeSet::new()
            }
        };
        tracing::debug!(path = %path.display(), keys = keys.len(), "ledger loaded");
        Self { path, keys }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns true when the key was not present before.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Write the sorted key list next to the target, then rename over it.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating ledger dir {}", dir.display()))?;
        }

        let sorted: Vec<&str> = self.keys().collect();
        let json = serde_json::to_string_pretty(&sorted).context("serializing ledger")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing ledger {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), keys = self.keys.len(), "ledger saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let l = Ledger::load(dir.path().join("nope.json"));
        assert!(l.is_empty());
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("sent.json");
        fs::write(&p, "{not json").unwrap();
        assert!(Ledger::load(&p).is_empty());

        fs::write(&p, r#"{"a": 1}"#).unwrap();
        assert!(Ledger::load(&p).is_empty());
    }

    #[test]
    fn save_is_sorted_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("state").join("sent.json");
        let mut l = Ledger::load(&p);
        assert!(l.insert("https://b"));
        assert!(l.insert("RemoteOK::Engineer::Acme"));
        assert!(l.insert("https://a"));
        assert!(!l.insert("https://a"));
        l.save().unwrap();

        let on_disk: Vec<String> = serde_json::from_str(&fs::read_to_string(&p).unwrap()).unwrap();
        assert_eq!(on_disk, vec!["RemoteOK::Engineer::Acme", "https://a", "https://b"]);

        let reloaded = Ledger::load(&p);
        assert_eq!(reloaded, l);
        assert!(reloaded.contains("https://a"));
        assert!(!reloaded.contains("https://A"));
    }

    #[test]
    fn empty_ledger_saves_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("sent.json");
        Ledger::load(&p).save().unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "[]");
    }
}
