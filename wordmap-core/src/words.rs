//! The aggregated word set: the host's single source of truth.
//!
//! Dedup key is the trimmed, lower-cased text; display text keeps the
//! casing of the first submission. The set is append-only for the life of
//! a session and counts only ever go up, so every broadcast snapshot is a
//! superset of the previous one.

use serde::{Deserialize, Serialize};

/// Longest submission a participant may send, in characters.
pub const MAX_WORD_LEN: usize = 25;

/// One aggregated word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Normalized dedup key (trimmed + lower-cased), unique within a set.
    pub id: String,
    /// Display text, as first submitted (trimmed, casing preserved).
    pub text: String,
    pub count: u32,
}

/// Insertion-ordered, append-only collection of [`WordEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    entries: Vec<WordEntry>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw submission into the set.
    ///
    /// Returns `true` when the set changed. Whitespace-only input is
    /// discarded silently and must not trigger a broadcast.
    pub fn submit(&mut self, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return false;
        }
        let key = trimmed.to_lowercase();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == key) {
            entry.count += 1;
            log::trace!("word '{}' incremented to {}", entry.id, entry.count);
        } else {
            log::trace!("word '{key}' added");
            self.entries.push(WordEntry {
                id: key,
                text: trimmed.to_string(),
                count: 1,
            });
        }
        true
    }

    /// Entries in first-appearance order.
    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    /// Owned copy of the full state, suitable for the wire.
    pub fn snapshot(&self) -> Vec<WordEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts — equals the number of non-empty submissions.
    pub fn total_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.count)).sum()
    }
}
