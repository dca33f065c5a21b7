//! On-disk cache of parsed tables with content-digest invalidation.
//!
//! Each source file gets one cache file, named after the xxh3 hash of its
//! path. The cache file stores the xxh3 digest of the source bytes it was
//! built from; a mismatch means the generator rewrote the file and the cached
//! table is discarded.

use crate::codec::parse_table;
use crate::error::LoadError;
use crate::table::SearchTable;
use postcard::{from_bytes, to_stdvec};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use xxhash_rust::xxh3::xxh3_64;

/// 64-bit content digest, displayed as 16 lowercase hex digits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Digest(pub u64);

impl Digest {
    pub fn of(bytes: &[u8]) -> Self {
        Self(xxh3_64(bytes))
    }

    /// Returns the digest as a lowercase hexadecimal string
    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 16 {
            return Err(ParseDigestError::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseDigestError::InvalidHex);
        }
        u64::from_str_radix(s, 16)
            .map(Digest)
            .map_err(|_| ParseDigestError::InvalidHex)
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for digest parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDigestError {
    #[error("invalid hexadecimal characters in digest string")]
    InvalidHex,
    #[error("invalid digest length: expected 16 hex characters, got {0}")]
    InvalidLength(usize),
}

#[derive(Deserialize)]
struct CachedTable {
    digest: Digest,
    table: SearchTable,
}

#[derive(Serialize)]
struct CachedRef<'a> {
    digest: Digest,
    table: &'a SearchTable,
}

/// Where the cached copy of `source` lives under `cache_dir`.
pub fn cache_path(cache_dir: &Path, source: &Path) -> PathBuf {
    let id = Digest::of(source.as_os_str().as_encoded_bytes());
    cache_dir.join(format!("{}.bin", id))
}

/// Loads the table at `path`, reusing a cached parse when the source bytes
/// are unchanged. With `cache_dir` set to `None` the file is always parsed.
///
/// Cache write failures are logged and otherwise ignored.
pub async fn load_or_parse(path: &Path, cache_dir: Option<&Path>) -> Result<SearchTable, LoadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LoadError::from_io(path.to_path_buf(), e))?;
    let digest = Digest::of(&bytes);

    let cache_file = cache_dir.map(|dir| cache_path(dir, path));
    if let Some(cache_file) = &cache_file
        && let Some(table) = load(cache_file, digest).await
    {
        tracing::debug!("Cache hit for {} ({} entries)", path.display(), table.len());
        return Ok(table);
    }

    let source_path = path.to_path_buf();
    let want_cache = cache_file.is_some();
    let (table, encoded) = tokio::task::spawn_blocking(move || {
        let text = String::from_utf8_lossy(&bytes);
        let table = parse_table(&text).map_err(|source| LoadError::Decode {
            path: source_path,
            source,
        })?;
        let encoded = want_cache.then(|| {
            to_stdvec(&CachedRef {
                digest,
                table: &table,
            })
        });
        Ok::<_, LoadError>((table, encoded))
    })
    .await
    .map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })??;

    tracing::info!(
        "Parsed {} ({} entries, {} occurrences)",
        path.display(),
        table.len(),
        table.occurrence_count()
    );

    match (cache_file, encoded) {
        (Some(cache_file), Some(Ok(bytes))) => store(&cache_file, &bytes).await,
        (Some(cache_file), Some(Err(e))) => {
            tracing::warn!("Failed to encode cached table for {}: {}", cache_file.display(), e);
        }
        _ => {}
    }
    Ok(table)
}

/// Reads a cache file, returning its table only if `digest` matches.
async fn load(path: &Path, digest: Digest) -> Option<SearchTable> {
    let bytes = tokio::fs::read(path).await.ok()?;
    let path = path.to_path_buf();

    // Deserialize in spawn_blocking since it's CPU intensive
    tokio::task::spawn_blocking(move || match from_bytes::<CachedTable>(&bytes) {
        Ok(cached) if cached.digest == digest => Some(cached.table),
        Ok(cached) => {
            tracing::info!(
                "Cache stale for {} (digest {} != {}), will reparse",
                path.display(),
                cached.digest,
                digest
            );
            None
        }
        Err(e) => {
            tracing::warn!("Failed to deserialize cached table at {}: {}", path.display(), e);
            None
        }
    })
    .await
    .ok()?
}

/// Writes a cache file, replacing any previous one.
async fn store(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        tracing::warn!("Failed to create cache directory {}: {}", parent.display(), e);
        return;
    }

    // Write to a sibling file first so readers never see a partial cache
    let tmp = path.with_extension("bin.tmp");
    let result = async {
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    match result {
        Ok(()) => tracing::debug!("Cached table to {}", path.display()),
        Err(e) => {
            tracing::warn!("Failed to write cached table to {}: {}", path.display(), e);
            let _ = tokio::fs::remove_file(&tmp).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use tempfile::TempDir;

    const SOURCE: &str = "var searchData=\n[\n  ['optional',['optional',['../d8/d86/classbpstd_1_1optional.html#a9d03',1,'bpstd::optional::optional() noexcept']]]\n];\n";

    #[rstest]
    #[case("123456789abcdef0", 0x1234_5678_9abc_def0)]
    #[case("0000000000000000", 0)]
    #[case("ffffffffffffffff", u64::MAX)]
    fn test_digest_parsing(#[case] s: &str, #[case] expected: u64) {
        let_assert!(Ok(digest) = s.parse::<Digest>());
        check!(digest == Digest(expected));
        check!(digest.to_string() == s);
    }

    #[rstest]
    #[case("zzzzzzzzzzzzzzzz", ParseDigestError::InvalidHex)]
    #[case("+23456789abcdef0", ParseDigestError::InvalidHex)]
    #[case("abc", ParseDigestError::InvalidLength(3))]
    #[case("", ParseDigestError::InvalidLength(0))]
    fn test_digest_parse_errors(#[case] s: &str, #[case] expected: ParseDigestError) {
        let_assert!(Err(err) = s.parse::<Digest>());
        check!(err == expected);
    }

    #[test]
    fn test_digest_serde() {
        let json = serde_json::to_string(&Digest(255)).unwrap();
        check!(json == "\"00000000000000ff\"");
        let back: Digest = serde_json::from_str(&json).unwrap();
        check!(back == Digest(255));
    }

    #[tokio::test]
    async fn test_cache_written_then_reused() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("functions_9.js");
        let cache_dir = dir.path().join("cache");
        std::fs::write(&source, SOURCE).unwrap();

        let_assert!(Ok(first) = load_or_parse(&source, Some(&cache_dir)).await);
        let cache_file = cache_path(&cache_dir, &source);
        check!(cache_file.exists());

        let_assert!(Some(cached) = load(&cache_file, Digest::of(SOURCE.as_bytes())).await);
        check!(cached == first);

        let_assert!(Ok(second) = load_or_parse(&source, Some(&cache_dir)).await);
        check!(second == first);
    }

    #[tokio::test]
    async fn test_stale_cache_is_replaced() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("functions_9.js");
        let cache_dir = dir.path().join("cache");
        std::fs::write(&source, SOURCE).unwrap();
        let_assert!(Ok(_) = load_or_parse(&source, Some(&cache_dir)).await);

        let updated = SOURCE.replace("a9d03", "a9d04");
        std::fs::write(&source, &updated).unwrap();
        let_assert!(Ok(table) = load_or_parse(&source, Some(&cache_dir)).await);
        check!(table.entries()[0].occurrences[0].anchor() == Some("a9d04"));

        let cache_file = cache_path(&cache_dir, &source);
        check!(load(&cache_file, Digest::of(SOURCE.as_bytes())).await.is_none());
        check!(load(&cache_file, Digest::of(updated.as_bytes())).await.is_some());
    }

    #[tokio::test]
    async fn test_missing_source_is_not_found() {
        let dir = TempDir::new().unwrap();
        let_assert!(Err(LoadError::NotFound { .. }) = load_or_parse(&dir.path().join("nope.js"), None).await);
    }

    #[tokio::test]
    async fn test_decode_error_carries_path() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken_0.js");
        std::fs::write(&source, "var searchData = [").unwrap();
        let_assert!(Err(LoadError::Decode { path, .. }) = load_or_parse(&source, None).await);
        check!(path == source);
    }
}
