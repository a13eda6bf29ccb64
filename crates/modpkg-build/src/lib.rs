//! Build engine for `.mods` content packages
//!
//! This crate turns a declarative build config into distributable package
//! artifacts. A run resolves declared packages into concrete build units
//! (expanding auto-split manifests), skips units whose source content is
//! unchanged since the last run, assembles the rest into `.mods` containers,
//! and optionally emits a checksummed index of everything produced.
//!
//! # Components
//!
//! - [`config`] - build config and package manifest model
//! - [`resolver`] - manifest expansion into [`PackageDefinition`]s
//! - [`fingerprint`] - recursive directory content hashing
//! - [`cache`] - the persistent source-fingerprint cache
//! - [`builder`] - `.mods` container assembly
//! - [`index`] - artifact checksum index
//! - [`run`] - the sequential orchestration of one full run
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> Result<(), modpkg_build::BuildError> {
//! let summary = modpkg_build::run(
//!     Path::new("build/build.json"),
//!     Path::new("build/out"),
//! )?;
//! println!("{} built, {} up to date", summary.built, summary.skipped);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod resolver;
pub mod run;

pub use cache::{BuildCache, CACHE_FILE_NAME};
pub use config::{
    AutoSplitMode, BuildConfig, BuildConfigPackage, PACKAGE_MANIFEST_NAME, PackageConfig,
    PackageEntry,
};
pub use error::{BuildError, BuildResult};
pub use fingerprint::{EMPTY_FINGERPRINT, directory_fingerprint};
pub use index::{BuildIndex, BuildIndexEntry, INDEX_FILE_NAME};
pub use resolver::{PackageDefinition, resolve_packages};
pub use run::{RunSummary, run};
