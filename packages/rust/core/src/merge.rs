//! Cross-chunk deduplication of extracted rows.
//!
//! Keys are compared case-insensitively and the first occurrence wins, so the
//! order chunks are fed in decides which value survives.

use std::collections::{BTreeSet, HashSet};

use reconreport_shared::ExtractedRow;

/// Ordered key/value rows with unique lowercase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedTable {
    rows: Vec<ExtractedRow>,
    seen: HashSet<String>,
}

impl MergedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `row` unless its key was already seen. Returns whether it was kept.
    pub fn insert(&mut self, row: ExtractedRow) -> bool {
        if self.seen.insert(row.key.to_lowercase()) {
            self.rows.push(row);
            true
        } else {
            false
        }
    }

    /// Value of the row whose key matches `key` case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        let wanted = key.to_lowercase();
        self.rows
            .iter()
            .find(|row| row.key.to_lowercase() == wanted)
            .map(|row| row.value.as_str())
    }

    pub fn rows(&self) -> &[ExtractedRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractedRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Merge per-chunk rows in chunk order.
pub fn merge<I>(rows_per_chunk: I) -> MergedTable
where
    I: IntoIterator<Item = Vec<ExtractedRow>>,
{
    let mut table = MergedTable::new();
    for rows in rows_per_chunk {
        for row in rows {
            table.insert(row);
        }
    }
    table
}

/// Union of per-chunk tool sets.
pub fn merge_tools<I>(tools_per_chunk: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = BTreeSet<String>>,
{
    tools_per_chunk.into_iter().flatten().collect()
}
