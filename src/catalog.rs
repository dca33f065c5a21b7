//! A generated `search/` directory: its manifest, its chunk files, and an
//! in-memory LRU of parsed tables.

use crate::cache::load_or_parse;
use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::escape::search_key;
use crate::sections::{MANIFEST_FILE, SectionFile, SectionIndex};
use crate::table::{IndexEntry, SearchTable};
use anyhow::Context;
use futures::future::join_all;
use ignore::WalkBuilder;
use lru::LruCache;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Section searched when none is named and the manifest has one.
pub const DEFAULT_SECTION: &str = "all";

/// A key found in one chunk of the catalog.
#[derive(Debug, Clone)]
pub struct CatalogHit {
    pub file: SectionFile,
    table: Arc<SearchTable>,
    position: usize,
}

impl CatalogHit {
    pub fn entry(&self) -> &IndexEntry {
        &self.table.entries()[self.position]
    }
}

pub struct SearchCatalog {
    dir: PathBuf,
    sections: Option<SectionIndex>,
    /// Chunk files present on disk, sorted.
    files: Vec<SectionFile>,
    cache_dir: Option<PathBuf>,
    tables: Mutex<LruCache<SectionFile, Arc<SearchTable>>>,
}

impl std::fmt::Debug for SearchCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCatalog")
            .field("dir", &self.dir)
            .field("sections", &self.sections.as_ref().map(|s| s.sections.len()))
            .field("files", &self.files.len())
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

impl SearchCatalog {
    /// Scans `dir` for chunk files and reads the manifest if there is one.
    pub async fn open(dir: &Path, config: &Config) -> Result<Self> {
        let mut files = BTreeSet::new();
        let mut has_manifest = false;
        let mut read_dir = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read search directory {}", dir.display()))?;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .with_context(|| format!("Failed to list {}", dir.display()))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name == MANIFEST_FILE {
                has_manifest = true;
            } else if let Some(file) = SectionFile::from_file_name(name) {
                files.insert(file);
            }
        }

        let sections = if has_manifest {
            let path = dir.join(MANIFEST_FILE);
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let index = SectionIndex::parse(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            for expected in index.chunk_files() {
                if !files.contains(&expected) {
                    tracing::warn!("{} lists {} but it is missing", MANIFEST_FILE, expected);
                }
            }
            Some(index)
        } else {
            None
        };

        let capacity = NonZeroUsize::new(config.lru_capacity).unwrap_or(NonZeroUsize::MIN);
        tracing::info!(
            "Opened search catalog {} ({} chunk files, manifest: {})",
            dir.display(),
            files.len(),
            has_manifest
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            sections,
            files: files.into_iter().collect(),
            cache_dir: config.effective_cache_dir(),
            tables: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sections(&self) -> Option<&SectionIndex> {
        self.sections.as_ref()
    }

    pub fn files(&self) -> &[SectionFile] {
        &self.files
    }

    /// Chunk files for `section`, or for the default scope when `None`:
    /// the `all` section if the catalog has it, otherwise every file.
    pub fn files_in(&self, section: Option<&str>) -> Vec<&SectionFile> {
        let section = section.or_else(|| {
            self.files
                .iter()
                .any(|f| f.section == DEFAULT_SECTION)
                .then_some(DEFAULT_SECTION)
        });
        self.files
            .iter()
            .filter(|f| section.is_none_or(|s| f.section == s))
            .collect()
    }

    pub fn path_of(&self, file: &SectionFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    /// Parsed table for one chunk, from memory, the disk cache, or the source.
    pub async fn table(&self, file: &SectionFile) -> std::result::Result<Arc<SearchTable>, LoadError> {
        if let Some(table) = self.tables.lock().await.get(file) {
            tracing::debug!("Memory cache hit for {}", file);
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_or_parse(&self.path_of(file), self.cache_dir.as_deref()).await?);
        self.tables.lock().await.put(file.clone(), Arc::clone(&table));
        Ok(table)
    }

    /// Loads every chunk file concurrently.
    pub async fn load_all(&self) -> Vec<(SectionFile, std::result::Result<Arc<SearchTable>, LoadError>)> {
        join_all(self.files.iter().map(|file| async move { (file.clone(), self.table(file).await) })).await
    }

    /// Finds `symbol` (a raw name such as `operator=`) in a section.
    pub async fn lookup(&self, symbol: &str, section: Option<&str>) -> std::result::Result<Vec<CatalogHit>, LoadError> {
        self.lookup_key(&search_key(symbol), section).await
    }

    /// Finds an already-escaped key in a section. Hits come back in file order.
    pub async fn lookup_key(&self, key: &str, section: Option<&str>) -> std::result::Result<Vec<CatalogHit>, LoadError> {
        let files = self.files_in(section);
        let tables = join_all(files.iter().map(|file| self.table(file))).await;

        let mut hits = vec![];
        for (file, table) in files.into_iter().zip(tables) {
            let table = table?;
            if let Some(position) = table.position(key) {
                hits.push(CatalogHit {
                    file: file.clone(),
                    table,
                    position,
                });
            }
        }
        tracing::debug!("Lookup '{}' found {} hits", key, hits.len());
        Ok(hits)
    }
}

/// Finds every directory under `root` that holds search chunk files or a
/// manifest. Ignore files are not honoured since generated documentation is
/// usually gitignored.
pub async fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut dirs = BTreeSet::new();
        for entry in WalkBuilder::new(&root).standard_filters(false).build() {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if (name == MANIFEST_FILE || SectionFile::from_file_name(name).is_some())
                && let Some(parent) = entry.path().parent()
            {
                dirs.insert(parent.to_path_buf());
            }
        }
        Ok(dirs.into_iter().collect())
    })
    .await
    .context("Task panicked")?
}
