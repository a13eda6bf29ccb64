//! Build config and package manifest model
//!
//! Two JSON documents drive a run. The build config lists the packages to
//! build and whether to emit an index:
//!
//! ```json
//! {
//!   "packages": [
//!     { "source_name": "tracks", "distribution_name": "tracks" }
//!   ],
//!   "generate_index": true
//! }
//! ```
//!
//! Each package has its own manifest at `<config_dir>/src/<source_name>/config.json`:
//!
//! ```json
//! {
//!   "encrypt_files": false,
//!   "auto_split_mode": "simple",
//!   "entries": [
//!     { "type": "directory", "local_path": "cars", "game_path": "cars" },
//!     { "type": "file", "local_path": "notes.txt", "game_path": "docs/notes.txt" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, BuildResult};

/// Name of the per-package manifest file inside a source directory
pub const PACKAGE_MANIFEST_NAME: &str = "config.json";

/// Top-level build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Packages to build, in declaration order
    pub packages: Vec<BuildConfigPackage>,

    /// Whether to emit `index.json` after the run
    pub generate_index: bool,
}

/// One declared package in the build config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfigPackage {
    /// Source directory name under `<config_dir>/src/`
    pub source_name: String,

    /// Output file stem; the artifact is `<distribution_name>.mods`
    pub distribution_name: String,
}

/// Per-package manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Whether payload entries are encrypted
    pub encrypt_files: bool,

    /// Policy for decomposing this manifest into multiple artifacts
    #[serde(default)]
    pub auto_split_mode: AutoSplitMode,

    /// Ordered package entries
    pub entries: Vec<PackageEntry>,
}

/// Auto-split policy for a package manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoSplitMode {
    /// One manifest, one artifact
    #[default]
    None,

    /// One artifact per Directory entry, plus a bundle for File entries
    Simple,

    /// Like `Simple`, but every nested subdirectory becomes its own artifact
    Aggressive,
}

/// A single manifest entry
///
/// `local_path` is relative to the package source directory; `game_path` is
/// the path inside the output archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PackageEntry {
    /// One file, packaged as-is
    File {
        /// Source path relative to the package base directory
        local_path: String,
        /// Archive path for the file
        game_path: String,
    },

    /// A directory packaged recursively
    Directory {
        /// Source path relative to the package base directory
        local_path: String,
        /// Archive path prefix for the subtree
        game_path: String,
    },
}

impl PackageEntry {
    /// Source path of this entry, relative to the package base directory
    pub fn local_path(&self) -> &str {
        match self {
            Self::File { local_path, .. } | Self::Directory { local_path, .. } => local_path,
        }
    }

    /// Archive path of this entry
    pub fn game_path(&self) -> &str {
        match self {
            Self::File { game_path, .. } | Self::Directory { game_path, .. } => game_path,
        }
    }

    /// Whether this entry is a directory
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}

impl BuildConfig {
    /// Load the build config from `path`
    ///
    /// # Errors
    ///
    /// [`BuildError::BuildConfigNotFound`] if the file does not exist,
    /// [`BuildError::InvalidConfig`] if it fails to parse.
    pub fn load(path: &Path) -> BuildResult<Self> {
        if !path.is_file() {
            return Err(BuildError::BuildConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| BuildError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl PackageConfig {
    /// Load the manifest for `package` from `path`
    ///
    /// # Errors
    ///
    /// [`BuildError::PackageConfigNotFound`] if the file does not exist,
    /// [`BuildError::InvalidConfig`] if it fails to parse.
    pub fn load(path: &Path, package: &str) -> BuildResult<Self> {
        if !path.is_file() {
            return Err(BuildError::PackageConfigNotFound {
                package: package.to_string(),
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| BuildError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_build_config() {
        let config: BuildConfig = serde_json::from_str(
            r#"{
                "packages": [
                    { "source_name": "tracks", "distribution_name": "tracks_dist" }
                ],
                "generate_index": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.packages.len(), 1);
        assert_eq!(config.packages[0].source_name, "tracks");
        assert_eq!(config.packages[0].distribution_name, "tracks_dist");
        assert!(config.generate_index);
    }

    #[test]
    fn parses_tagged_entries() {
        let config: PackageConfig = serde_json::from_str(
            r#"{
                "encrypt_files": true,
                "auto_split_mode": "aggressive",
                "entries": [
                    { "type": "file", "local_path": "a.txt", "game_path": "a.txt" },
                    { "type": "directory", "local_path": "cars", "game_path": "cars" }
                ]
            }"#,
        )
        .unwrap();

        assert!(config.encrypt_files);
        assert_eq!(config.auto_split_mode, AutoSplitMode::Aggressive);
        assert_eq!(
            config.entries[0],
            PackageEntry::File {
                local_path: "a.txt".to_string(),
                game_path: "a.txt".to_string(),
            }
        );
        assert!(config.entries[1].is_directory());
    }

    #[test]
    fn auto_split_mode_defaults_to_none() {
        let config: PackageConfig = serde_json::from_str(
            r#"{ "encrypt_files": false, "entries": [] }"#,
        )
        .unwrap();
        assert_eq!(config.auto_split_mode, AutoSplitMode::None);
    }

    #[test]
    fn rejects_unknown_split_mode() {
        let result: Result<PackageConfig, _> = serde_json::from_str(
            r#"{ "encrypt_files": false, "auto_split_mode": "sideways", "entries": [] }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_entry_type() {
        let result: Result<PackageEntry, _> = serde_json::from_str(
            r#"{ "type": "symlink", "local_path": "x", "game_path": "x" }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_missing_build_config_is_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("build.json");
        assert!(matches!(
            BuildConfig::load(&missing),
            Err(BuildError::BuildConfigNotFound { .. })
        ));
    }

    #[test]
    fn load_corrupt_manifest_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            PackageConfig::load(&path, "tracks"),
            Err(BuildError::InvalidConfig { .. })
        ));
    }
}
