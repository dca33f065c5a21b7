//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Tests that touch the filesystem get a fresh temporary directory with the
//! fixture search files copied in, plus a private cache directory, so no test
//! observes another test's cache files.
//!
//! # Available Fixtures
//!
//! - `functions_chunk`: the generator's `functions_9.js` as text
//! - `fixture_table`: the same file parsed into a `SearchTable`
//! - `isolated_docs`: a temp documentation tree with `api/latest/search/`
//!   holding every fixture chunk and the manifest that lists them

use doxy_search::{Config, SearchTable, parse_table};
use rstest::fixture;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Returns the directory holding the fixture search files.
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/search")
}

#[fixture]
pub fn functions_chunk() -> String {
    std::fs::read_to_string(fixture_dir().join("functions_9.js"))
        .expect("Failed to read functions_9.js fixture")
}

#[fixture]
pub fn fixture_table(functions_chunk: String) -> SearchTable {
    parse_table(&functions_chunk).expect("Fixture should parse")
}

/// A temporary documentation tree for tests that read files or caches.
///
/// Layout:
/// ```text
/// <root>/api/latest/search/functions_0.js ... functions_9.js
/// <root>/api/latest/search/searchdata.js
/// <root>/cache/
/// ```
#[allow(dead_code)] // Methods used across different integration test crates
pub struct IsolatedDocs {
    _temp: TempDir,
    root: PathBuf,
    pub config: Config,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl IsolatedDocs {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        let search = root.join("api/latest/search");
        std::fs::create_dir_all(&search).expect("Failed to create search directory");
        let fixtures = std::fs::read_dir(fixture_dir()).expect("Failed to list fixture directory");
        for fixture in fixtures {
            let fixture = fixture.expect("Failed to read fixture entry");
            let name = fixture.file_name();
            std::fs::copy(fixture.path(), search.join(&name))
                .unwrap_or_else(|e| panic!("Failed to copy fixture {:?}: {}", name, e));
        }
        let config = Config {
            cache_dir: Some(root.join("cache")),
            ..Config::default()
        };
        Self {
            _temp: temp,
            root,
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn search_dir(&self) -> PathBuf {
        self.root.join("api/latest/search")
    }

    pub fn chunk_path(&self) -> PathBuf {
        self.search_dir().join("functions_9.js")
    }

    /// Writes (or overwrites) a file relative to the search directory.
    pub fn write_search_file(&self, name: &str, content: &str) {
        std::fs::write(self.search_dir().join(name), content)
            .unwrap_or_else(|e| panic!("Failed to write '{}': {}", name, e));
    }
}

#[fixture]
pub fn isolated_docs() -> IsolatedDocs {
    IsolatedDocs::new()
}
