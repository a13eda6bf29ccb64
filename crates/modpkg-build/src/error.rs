//! Build engine error types
//!
//! Every error here is terminal for the run: the orchestrator aborts at the
//! first occurrence and neither the cache sidecar nor the build index is
//! written.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving, checking, or building packages
#[derive(Debug, Error)]
pub enum BuildError {
    /// The top-level build config file does not exist
    #[error("could not find build config file, looked for: {path}")]
    BuildConfigNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// A declared package has no manifest in its source directory
    #[error("could not find config for package '{package}', looked for: {path}")]
    PackageConfigNotFound {
        /// Declared source name
        package: String,
        /// Path that was checked
        path: PathBuf,
    },

    /// A config or manifest file failed to parse
    #[error("invalid config {path}: {source}")]
    InvalidConfig {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Auto-split requires root-level entries
    #[error(
        "auto-split failed for package '{package}': entry game path '{game_path}' is not root-level"
    )]
    NonRootEntry {
        /// Declared source name
        package: String,
        /// Offending entry game path
        game_path: String,
    },

    /// A declared file entry points at a path that does not exist
    #[error("package '{package}': file {path} does not exist")]
    MissingFile {
        /// Package source name
        package: String,
        /// Missing source path
        path: PathBuf,
    },

    /// A declared directory entry points at a path that does not exist
    #[error("package '{package}': directory {path} does not exist")]
    MissingDirectory {
        /// Package source name
        package: String,
        /// Missing source path
        path: PathBuf,
    },

    /// An artifact expected by the index generator is missing
    #[error("expected build artifact {path} is missing")]
    MissingArtifact {
        /// Artifact path that should have been produced earlier in the run
        path: PathBuf,
    },

    /// Container format error
    #[error(transparent)]
    Format(#[from] modpkg_format::FormatError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for build engine operations
pub type BuildResult<T> = Result<T, BuildError>;
