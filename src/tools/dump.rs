use crate::cache::load_or_parse;
use crate::codec::write_table;
use crate::config::Config;
use crate::error::Result;
use anyhow::Context;
use std::path::PathBuf;

/// Parameters for the dump command
#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub path: PathBuf,
    /// Emit pretty JSON instead of the generator layout
    pub json: bool,
}

/// Print a chunk file as JSON, or re-emit it in the generator's layout.
pub async fn handle_dump(config: &Config, request: DumpRequest) -> Result<String> {
    let cache_dir = config.effective_cache_dir();
    let table = load_or_parse(&request.path, cache_dir.as_deref()).await?;
    if request.json {
        let mut json = serde_json::to_string_pretty(&table).context("Failed to serialize table")?;
        json.push('\n');
        Ok(json)
    } else {
        Ok(write_table(&table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SearchTable;
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_dump_normalizes_layout() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("all_0.js");
        std::fs::write(&file, "var searchData = [\n  [ 'any', [ 'any', [ 'a.html#x', 1, 'bpstd::any' ] ] ],\n];").unwrap();
        let config = Config {
            cache_enabled: false,
            ..Config::default()
        };

        let request = DumpRequest {
            path: file.clone(),
            json: false,
        };
        let_assert!(Ok(text) = handle_dump(&config, request).await);
        check!(text == "var searchData=\n[\n  ['any',['any',['a.html#x',1,'bpstd::any']]]\n];\n");

        let request = DumpRequest { path: file, json: true };
        let_assert!(Ok(json) = handle_dump(&config, request).await);
        let_assert!(Ok(table) = serde_json::from_str::<SearchTable>(&json));
        check!(table.get("any").is_some());
    }
}
