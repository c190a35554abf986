use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::{RagError, Result};

/// One entry of the record file: either a bare string or an object with `text`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordEntry {
    Text(String),
    Object { text: String },
}

impl From<RecordEntry> for String {
    fn from(entry: RecordEntry) -> Self {
        match entry {
            RecordEntry::Text(text) | RecordEntry::Object { text } => text,
        }
    }
}

/// Ordered corpus texts, addressed by the same positions as the index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Records {
    texts: Vec<String>,
}

impl Records {
    #[inline]
    pub fn new(texts: Vec<String>) -> Self {
        Self { texts }
    }

    /// Load the JSON record file
    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RagError::storage(path, e))?;
        let records = Self::from_json(&content).map_err(|e| RagError::storage(path, e))?;

        debug!("Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }

    #[inline]
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let entries: Vec<RecordEntry> = serde_json::from_str(content)?;
        Ok(Self {
            texts: entries.into_iter().map(String::from).collect(),
        })
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&str> {
        self.texts.get(position).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
