// src/notify/seen.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Seen store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Seen store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Links already reported, per search term.
///
/// Terms are tracked independently: the same listing can be reported once for
/// each term that matches it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenStore {
    queries: BTreeMap<String, Vec<String>>,
}

impl SeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        tracing::info!("Loading file {}", path.display());
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes a sibling temp file and renames it over `path`.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        tracing::info!("Saving file {}", path.display());

        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");

        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Links seen for `query`, oldest first. Unknown queries have none.
    pub fn links(&self, query: &str) -> &[String] {
        self.queries.get(query).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, query: &str, link: &str) -> bool {
        self.links(query).iter().any(|l| l == link)
    }

    /// Appends links not already recorded for `query`, keeping their order.
    pub fn mark_seen<I, S>(&mut self, query: &str, links: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.queries.entry(query.to_string()).or_default();
        for link in links {
            let link = link.into();
            if !entry.contains(&link) {
                entry.push(link);
            }
        }
    }

    /// Makes sure `query` has an entry, even an empty one.
    pub fn track(&mut self, query: &str) {
        self.queries.entry(query.to_string()).or_default();
    }

    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
