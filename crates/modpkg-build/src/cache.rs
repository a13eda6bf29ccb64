//! Persistent build cache
//!
//! The cache is a flat `source_name -> fingerprint` map stored as a JSON
//! sidecar next to the build config. It is loaded once at the start of a
//! run, updated in memory as packages are checked, and flushed back exactly
//! once after the whole run succeeded. A failed run never touches the file,
//! so a later run re-checks everything the failed one recorded.

use std::collections::BTreeMap;
use std::fs;
use std::io::Error as IoError;
use std::path::PathBuf;

use crate::error::{BuildError, BuildResult};

/// Cache sidecar file name, colocated with the build config
pub const CACHE_FILE_NAME: &str = ".pkg-cache.json";

/// In-memory build cache bound to its sidecar path
#[derive(Debug)]
pub struct BuildCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl BuildCache {
    /// Load the cache from `path`
    ///
    /// An absent sidecar yields an empty cache; an unreadable or corrupt one
    /// is an error.
    pub fn load(path: PathBuf) -> BuildResult<Self> {
        let entries = if path.is_file() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text).map_err(|source| BuildError::InvalidConfig {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// An empty cache bound to `path`, for tests and fresh setups
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Whether the cached fingerprint for `source_name` matches `fingerprint`
    pub fn is_current(&self, source_name: &str, fingerprint: &str) -> bool {
        self.entries
            .get(source_name)
            .is_some_and(|cached| cached == fingerprint)
    }

    /// Upsert the fingerprint for `source_name` in memory
    pub fn record(&mut self, source_name: &str, fingerprint: String) {
        self.entries.insert(source_name.to_string(), fingerprint);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache back to its sidecar path
    pub fn flush(&self) -> BuildResult<()> {
        let text = serde_json::to_string_pretty(&self.entries).map_err(IoError::other)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_sidecar_yields_empty_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::load(tmp.path().join(CACHE_FILE_NAME)).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_sidecar_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CACHE_FILE_NAME);
        fs::write(&path, b"}{").unwrap();
        assert!(matches!(
            BuildCache::load(path),
            Err(BuildError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn record_then_flush_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CACHE_FILE_NAME);

        let mut cache = BuildCache::load(path.clone()).unwrap();
        cache.record("tracks", "abc123".to_string());
        cache.record("cars/gtr", "def456".to_string());
        cache.flush().unwrap();

        let reloaded = BuildCache::load(path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.is_current("tracks", "abc123"));
        assert!(reloaded.is_current("cars/gtr", "def456"));
    }

    #[test]
    fn stale_and_unknown_names_are_not_current() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = BuildCache::empty(tmp.path().join(CACHE_FILE_NAME));
        cache.record("tracks", "abc".to_string());

        assert!(cache.is_current("tracks", "abc"));
        assert!(!cache.is_current("tracks", "changed"));
        assert!(!cache.is_current("unknown", "abc"));
    }

    #[test]
    fn record_overwrites_previous_fingerprint() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = BuildCache::empty(tmp.path().join(CACHE_FILE_NAME));
        cache.record("tracks", "old".to_string());
        cache.record("tracks", "new".to_string());

        assert_eq!(cache.len(), 1);
        assert!(cache.is_current("tracks", "new"));
        assert!(!cache.is_current("tracks", "old"));
    }
}
