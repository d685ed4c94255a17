//! Read-side view of a compiled text artifact.
//!
//! `makedb` stores each `<key> <payload>` line as one database entry. A
//! [`RecordTable`] loads the same lines into memory so an artifact can be
//! queried by any of its keys before it is installed.

use std::collections::HashMap;

use super::key::RecordKey;

/// Key to payload map of one text artifact.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    entries: HashMap<RecordKey, String>,
}

impl RecordTable {
    /// Parse artifact text. Lines without a recognizable key are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let (key, payload) = line.split_once(' ')?;
                Some((RecordKey::parse(key)?, payload.to_string()))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &RecordKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn by_id(&self, id: u32) -> Option<&str> {
        self.get(&RecordKey::Id(id))
    }

    pub fn by_index(&self, index: usize) -> Option<&str> {
        self.get(&RecordKey::Index(index))
    }

    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.get(&RecordKey::Name(name.to_string()))
    }

    /// Number of key entries, three per record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
