//! Structural checks over parsed entries.
//!
//! Unlike [`SearchTable::new`](crate::table::SearchTable::new), validation
//! keeps going after the first problem and reports all of them.

use crate::escape::{is_search_key, search_key, unescape_html};
use crate::table::IndexEntry;
use ahash::AHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// `<dir>/…/<file>.html` optionally followed by `#anchor`. Leading `../`
/// segments are allowed; absolute urls and query strings are not.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\.\./)*(?:[A-Za-z0-9_.\-]+/)*[A-Za-z0-9_.\-]+\.html(?:#[A-Za-z0-9_\-]+)?$")
        .expect("valid regex")
});

/// Knobs for [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Treat occurrence urls without `#anchor` as errors.
    pub require_anchor: bool,
    /// Do not warn when an entry lists the same url twice.
    pub allow_duplicate_occurrences: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            require_anchor: false,
            allow_duplicate_occurrences: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A single problem, located by entry (and occurrence) index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("entry {entry}: empty key")]
    EmptyKey { entry: usize },
    #[error("entry {entry}: '{key}' is not a valid search key")]
    MalformedKey { entry: usize, key: String },
    #[error("entry {entry}: key '{key}' already used by entry {first}")]
    DuplicateKey {
        entry: usize,
        key: String,
        first: usize,
    },
    #[error("entry {entry}: '{key}' has no occurrences")]
    NoOccurrences { entry: usize, key: String },
    #[error("entry {entry}: empty label")]
    EmptyLabel { entry: usize },
    #[error("entry {entry}: label '{label}' escapes to '{expected}', not '{key}'")]
    LabelKeyMismatch {
        entry: usize,
        key: String,
        label: String,
        expected: String,
    },
    #[error("entry {entry}, occurrence {occurrence}: empty title")]
    EmptyTitle { entry: usize, occurrence: usize },
    #[error("entry {entry}, occurrence {occurrence}: malformed url '{url}'")]
    MalformedUrl {
        entry: usize,
        occurrence: usize,
        url: String,
    },
    #[error("entry {entry}, occurrence {occurrence}: url '{url}' has no anchor")]
    MissingAnchor {
        entry: usize,
        occurrence: usize,
        url: String,
    },
    #[error("entry {entry}, occurrence {occurrence}: url '{url}' repeats occurrence {first}")]
    DuplicateOccurrence {
        entry: usize,
        occurrence: usize,
        first: usize,
        url: String,
    },
}

impl Violation {
    pub fn severity(&self) -> Severity {
        match self {
            Self::LabelKeyMismatch { .. } | Self::DuplicateOccurrence { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Every violation found, in entry order.
///
/// Serializes with its error and warning counts, and each violation carries
/// its `severity`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub entries: usize,
    pub occurrences: usize,
    pub violations: Vec<Violation>,
}

#[derive(Serialize)]
struct RatedViolation<'a> {
    severity: Severity,
    #[serde(flatten)]
    violation: &'a Violation,
}

impl Serialize for ValidationReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let violations: Vec<RatedViolation<'_>> = self
            .violations
            .iter()
            .map(|violation| RatedViolation {
                severity: violation.severity(),
                violation,
            })
            .collect();
        let mut state = serializer.serialize_struct("ValidationReport", 5)?;
        state.serialize_field("entries", &self.entries)?;
        state.serialize_field("occurrences", &self.occurrences)?;
        state.serialize_field("error_count", &self.error_count())?;
        state.serialize_field("warning_count", &self.warning_count())?;
        state.serialize_field("violations", &violations)?;
        state.end()
    }
}

impl ValidationReport {
    /// No error-level violations.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity() == severity)
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity() == Severity::Error)
    }
}

/// Checks `entries` against the table invariants and the url/escaping
/// conventions.
pub fn validate(entries: &[IndexEntry], options: &ValidationOptions) -> ValidationReport {
    let mut violations = vec![];
    let mut seen: AHashMap<&str, usize> = AHashMap::with_capacity(entries.len());

    for (entry_idx, entry) in entries.iter().enumerate() {
        let key = entry.key.as_str();
        if key.is_empty() {
            violations.push(Violation::EmptyKey { entry: entry_idx });
        } else {
            if !is_search_key(key) {
                violations.push(Violation::MalformedKey {
                    entry: entry_idx,
                    key: key.to_string(),
                });
            }
            if let Some(&first) = seen.get(key) {
                violations.push(Violation::DuplicateKey {
                    entry: entry_idx,
                    key: key.to_string(),
                    first,
                });
            } else {
                seen.insert(key, entry_idx);
            }
        }

        if entry.label.is_empty() {
            violations.push(Violation::EmptyLabel { entry: entry_idx });
        } else if !key.is_empty() {
            let expected = search_key(&unescape_html(&entry.label));
            if expected != key {
                violations.push(Violation::LabelKeyMismatch {
                    entry: entry_idx,
                    key: key.to_string(),
                    label: entry.label.clone(),
                    expected,
                });
            }
        }

        if entry.occurrences.is_empty() {
            violations.push(Violation::NoOccurrences {
                entry: entry_idx,
                key: key.to_string(),
            });
        }

        let mut urls: AHashMap<&str, usize> = AHashMap::new();
        for (occ_idx, occ) in entry.occurrences.iter().enumerate() {
            if occ.title.is_empty() {
                violations.push(Violation::EmptyTitle {
                    entry: entry_idx,
                    occurrence: occ_idx,
                });
            }
            if !URL_RE.is_match(&occ.url) {
                violations.push(Violation::MalformedUrl {
                    entry: entry_idx,
                    occurrence: occ_idx,
                    url: occ.url.clone(),
                });
            } else if options.require_anchor && occ.anchor().is_none() {
                violations.push(Violation::MissingAnchor {
                    entry: entry_idx,
                    occurrence: occ_idx,
                    url: occ.url.clone(),
                });
            }
            match urls.get(occ.url.as_str()) {
                Some(&first) if !options.allow_duplicate_occurrences => {
                    violations.push(Violation::DuplicateOccurrence {
                        entry: entry_idx,
                        occurrence: occ_idx,
                        first,
                        url: occ.url.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    urls.insert(&occ.url, occ_idx);
                }
            }
        }
    }

    ValidationReport {
        entries: entries.len(),
        occurrences: entries.iter().map(|e| e.occurrences.len()).sum(),
        violations,
    }
}

/// Anchors shared by more than one occurrence across all entries.
///
/// The generator assigns one anchor per declaration, so an anchor reused
/// under a different title usually means two declarations collided.
pub fn conflicting_anchors(entries: &[IndexEntry]) -> Vec<String> {
    let mut titles: AHashMap<&str, HashSet<&str>> = AHashMap::new();
    for occ in entries.iter().flat_map(|e| &e.occurrences) {
        if let Some(anchor) = occ.anchor() {
            titles.entry(anchor).or_default().insert(&occ.title);
        }
    }
    let mut conflicts: Vec<String> = titles
        .into_iter()
        .filter(|(_, t)| t.len() > 1)
        .map(|(anchor, _)| anchor.to_string())
        .collect();
    conflicts.sort();
    conflicts
}
