//! Typed model of a search data table.

use crate::escape::{search_key, unescape_html};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One documented declaration a key points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Page path relative to the search directory, usually with an anchor.
    pub url: String,
    /// Link opens in the parent frame rather than the search frame.
    pub parent_target: bool,
    /// Scope or full signature, HTML-escaped as stored.
    pub title: String,
}

impl Occurrence {
    /// Title with HTML entities decoded.
    pub fn title_text(&self) -> Cow<'_, str> {
        unescape_html(&self.title)
    }

    /// Page part of the url (before `#`).
    pub fn page(&self) -> &str {
        self.url.split_once('#').map_or(self.url.as_str(), |(page, _)| page)
    }

    /// Anchor fragment without the `#`, if any.
    pub fn anchor(&self) -> Option<&str> {
        self.url.split_once('#').map(|(_, anchor)| anchor)
    }
}

/// A key and everything it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Escaped search key, see [`crate::escape::search_key`].
    pub key: String,
    /// Display name, HTML-escaped as stored.
    pub label: String,
    pub occurrences: Vec<Occurrence>,
}

impl IndexEntry {
    /// Label with HTML entities decoded.
    pub fn label_text(&self) -> Cow<'_, str> {
        unescape_html(&self.label)
    }
}

/// Error returned when entries violate a table invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("entry {index} has an empty key")]
    EmptyKey { index: usize },
    #[error("key '{key}' appears at entries {first} and {second}")]
    DuplicateKey {
        key: String,
        first: usize,
        second: usize,
    },
    #[error("key '{key}' (entry {index}) has no occurrences")]
    NoOccurrences { key: String, index: usize },
}

/// An immutable, ordered search table with key lookup.
///
/// Order is the generator's insertion order and is preserved through
/// serialization; it is not sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "Vec<IndexEntry>", try_from = "Vec<IndexEntry>")]
pub struct SearchTable {
    entries: Vec<IndexEntry>,
    positions: AHashMap<String, usize>,
}

impl SearchTable {
    /// Builds a table, rejecting empty or duplicate keys and entries without
    /// occurrences.
    pub fn new(entries: Vec<IndexEntry>) -> Result<Self, TableError> {
        let mut positions = AHashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.key.is_empty() {
                return Err(TableError::EmptyKey { index });
            }
            if entry.occurrences.is_empty() {
                return Err(TableError::NoOccurrences {
                    key: entry.key.clone(),
                    index,
                });
            }
            if let Some(first) = positions.insert(entry.key.clone(), index) {
                return Err(TableError::DuplicateKey {
                    key: entry.key.clone(),
                    first,
                    second: index,
                });
            }
        }
        Ok(Self { entries, positions })
    }

    /// Exact lookup by escaped key.
    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.positions.get(key).map(|&i| &self.entries[i])
    }

    /// Lookup by raw symbol name, e.g. `operator=`.
    pub fn find_symbol(&self, symbol: &str) -> Option<&IndexEntry> {
        self.get(&search_key(symbol))
    }

    /// Position of `key` in insertion order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of occurrences across all entries.
    pub fn occurrence_count(&self) -> usize {
        self.entries.iter().map(|e| e.occurrences.len()).sum()
    }

    pub fn into_entries(self) -> Vec<IndexEntry> {
        self.entries
    }
}

impl PartialEq for SearchTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for SearchTable {}

impl TryFrom<Vec<IndexEntry>> for SearchTable {
    type Error = TableError;

    fn try_from(entries: Vec<IndexEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<SearchTable> for Vec<IndexEntry> {
    fn from(table: SearchTable) -> Self {
        table.entries
    }
}

impl<'a> IntoIterator for &'a SearchTable {
    type Item = &'a IndexEntry;
    type IntoIter = std::slice::Iter<'a, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    fn occurrence(url: &str, title: &str) -> Occurrence {
        Occurrence {
            url: url.to_string(),
            parent_target: true,
            title: title.to_string(),
        }
    }

    fn entry(key: &str, occurrences: Vec<Occurrence>) -> IndexEntry {
        IndexEntry {
            key: key.to_string(),
            label: key.to_string(),
            occurrences,
        }
    }

    #[test]
    fn test_lookup_preserves_insertion_order() {
        let_assert!(
            Ok(table) = SearchTable::new(vec![
                entry("zeta", vec![occurrence("z.html#1", "z")]),
                entry("alpha", vec![occurrence("a.html#1", "a")]),
            ])
        );
        check!(table.keys().collect::<Vec<_>>() == vec!["zeta", "alpha"]);
        check!(table.position("alpha") == Some(1));
        check!(table.get("alpha").map(|e| e.key.as_str()) == Some("alpha"));
        check!(table.get("beta").is_none());
        check!(table.occurrence_count() == 2);
    }

    #[test]
    fn test_find_symbol_escapes() {
        let_assert!(Ok(table) = SearchTable::new(vec![entry("operator_3d", vec![occurrence("a.html#x", "t")])]));
        check!(table.find_symbol("operator=").is_some());
        check!(table.find_symbol("operator==").is_none());
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let result = SearchTable::new(vec![
            entry("a", vec![occurrence("a.html#1", "a")]),
            entry("b", vec![occurrence("b.html#1", "b")]),
            entry("a", vec![occurrence("a.html#2", "a")]),
        ]);
        let_assert!(Err(TableError::DuplicateKey { key, first, second }) = result);
        check!(key == "a");
        check!(first == 0);
        check!(second == 2);
    }

    #[test]
    fn test_rejects_empty_key_and_empty_occurrences() {
        let_assert!(Err(TableError::EmptyKey { index: 0 }) = SearchTable::new(vec![entry("", vec![occurrence("a.html", "a")])]));
        let_assert!(Err(TableError::NoOccurrences { index: 0, .. }) = SearchTable::new(vec![entry("a", vec![])]));
    }

    #[test]
    fn test_occurrence_url_parts() {
        let occ = occurrence("../d8/d86/classbpstd_1_1optional.html#a51b2", "t");
        check!(occ.page() == "../d8/d86/classbpstd_1_1optional.html");
        check!(occ.anchor() == Some("a51b2"));
        let page_only = occurrence("../d8/d86/classbpstd_1_1optional.html", "t");
        check!(page_only.anchor().is_none());
    }

    #[test]
    fn test_serde_rejects_invalid_tables() {
        let json = r#"[{"key":"a","label":"a","occurrences":[]}]"#;
        check!(serde_json::from_str::<SearchTable>(json).is_err());
    }

    #[test]
    fn test_serde_json_round_trip_keeps_order() {
        let_assert!(
            Ok(table) = SearchTable::new(vec![
                entry("b", vec![occurrence("b.html#1", "b")]),
                entry("a", vec![occurrence("a.html#1", "a&amp;b")]),
            ])
        );
        let json = serde_json::to_string(&table).unwrap();
        let back: SearchTable = serde_json::from_str(&json).unwrap();
        check!(back == table);
        check!(back.position("a") == Some(1));
    }
}
