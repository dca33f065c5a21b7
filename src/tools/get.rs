use crate::cache::load_or_parse;
use crate::catalog::SearchCatalog;
use crate::config::Config;
use crate::error::Result;
use crate::escape::search_key;
use crate::format::{render_entry, render_suggestions};
use crate::suggest::{KeySuggestion, suggest};
use std::fmt::Write;
use std::path::PathBuf;

/// Parameters for the get command
#[derive(Debug, Clone)]
pub struct GetRequest {
    /// A chunk file or a search directory
    pub path: PathBuf,
    /// Symbol name such as `operator=`, or an escaped key with `raw_key`
    pub symbol: String,
    /// Section to search when `path` is a directory
    pub section: Option<String>,
    /// Treat `symbol` as an already-escaped key
    pub raw_key: bool,
}

/// Look a symbol up and render its occurrences, or suggestions on a miss.
///
/// Returns the rendered text and whether the symbol was found.
pub async fn handle_get(config: &Config, request: GetRequest) -> Result<(String, bool)> {
    let key = if request.raw_key {
        request.symbol.clone()
    } else {
        search_key(&request.symbol)
    };

    let mut output = String::new();
    if request.path.is_dir() {
        let catalog = SearchCatalog::open(&request.path, config).await?;
        let hits = catalog.lookup_key(&key, request.section.as_deref()).await?;
        if !hits.is_empty() {
            for hit in &hits {
                let _ = writeln!(output, "[{}]", hit.file);
                render_entry(&mut output, hit.entry());
            }
            return Ok((output, true));
        }

        // Rank suggestions across every table in scope
        let mut tables = vec![];
        for file in catalog.files_in(request.section.as_deref()) {
            tables.push(catalog.table(file).await?);
        }
        let mut suggestions: Vec<KeySuggestion<'_>> = tables
            .iter()
            .flat_map(|table| suggest(table, &key, config.suggestions))
            .collect();
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.entry.key.cmp(&b.entry.key)));
        suggestions.dedup_by(|a, b| a.entry.key == b.entry.key);
        suggestions.truncate(config.suggestions);
        render_suggestions(&mut output, &request.symbol, &suggestions);
        return Ok((output, false));
    }

    let cache_dir = config.effective_cache_dir();
    let table = load_or_parse(&request.path, cache_dir.as_deref()).await?;
    match table.get(&key) {
        Some(entry) => {
            render_entry(&mut output, entry);
            Ok((output, true))
        }
        None => {
            let suggestions = suggest(&table, &key, config.suggestions);
            render_suggestions(&mut output, &request.symbol, &suggestions);
            Ok((output, false))
        }
    }
}
