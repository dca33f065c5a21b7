//! Near-miss key suggestions for failed lookups.

use crate::escape::search_key;
use crate::table::{IndexEntry, SearchTable};
use rapidfuzz::distance::jaro_winkler;

/// Suggestions scoring below this are dropped.
pub const MIN_SCORE: f64 = 0.7;

/// A fuzzy key suggestion with relevance score.
#[derive(Debug, Clone)]
pub struct KeySuggestion<'a> {
    pub entry: &'a IndexEntry,
    /// Jaro-Winkler similarity (0.0 to 1.0, higher is better).
    pub score: f64,
}

/// Ranks keys in `table` by similarity to `query`, best first.
///
/// `query` may be a raw symbol (`operator==`) or an escaped key; it is
/// escaped before comparison either way.
pub fn suggest<'a>(table: &'a SearchTable, query: &str, limit: usize) -> Vec<KeySuggestion<'a>> {
    let query = if crate::escape::is_search_key(query) {
        query.to_string()
    } else {
        search_key(query)
    };

    let mut suggestions: Vec<KeySuggestion<'a>> = table
        .iter()
        .filter(|entry| entry.key != query)
        .filter_map(|entry| {
            let score = jaro_winkler::similarity(query.chars(), entry.key.chars());
            (score >= MIN_SCORE).then_some(KeySuggestion { entry, score })
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.entry.key.cmp(&b.entry.key)));
    suggestions.truncate(limit);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Occurrence;
    use assert2::check;

    fn table(keys: &[&str]) -> SearchTable {
        let entries = keys
            .iter()
            .map(|key| IndexEntry {
                key: (*key).to_string(),
                label: (*key).to_string(),
                occurrences: vec![Occurrence {
                    url: "a.html#x".to_string(),
                    parent_target: true,
                    title: "t".to_string(),
                }],
            })
            .collect();
        SearchTable::new(entries).unwrap()
    }

    #[test]
    fn test_suggests_close_operator() {
        let table = table(&["operator_3d", "operator_2a", "optional", "value_5for"]);
        let suggestions = suggest(&table, "operator==", 3);
        check!(!suggestions.is_empty());
        check!(suggestions[0].entry.key == "operator_3d");
        check!(suggestions.windows(2).all(|w| w[0].score >= w[1].score));
        check!(suggestions.iter().all(|s| s.score >= MIN_SCORE));
    }

    #[test]
    fn test_limit_and_exact_match_excluded() {
        let table = table(&["optional", "optional_5fvalue", "opt"]);
        let suggestions = suggest(&table, "optional", 1);
        check!(suggestions.len() == 1);
        check!(suggestions[0].entry.key != "optional");
    }

    #[test]
    fn test_unrelated_query_yields_nothing() {
        let table = table(&["operator_3d"]);
        check!(suggest(&table, "zzzz", 5).is_empty());
    }
}
