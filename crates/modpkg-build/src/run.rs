//! Run orchestration
//!
//! One run is strictly sequential: load config, load cache, resolve every
//! declared package, then check and build definitions one at a time in
//! resolver order. The cache sidecar and the build index are only written
//! after the whole batch succeeded; any error aborts the run with nothing
//! persisted.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::builder::build_package;
use crate::cache::{BuildCache, CACHE_FILE_NAME};
use crate::config::BuildConfig;
use crate::error::BuildResult;
use crate::fingerprint::directory_fingerprint;
use crate::index::{generate_index, write_index};
use crate::resolver::resolve_packages;

/// Outcome counts of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Total package definitions processed
    pub definitions: usize,

    /// Definitions rebuilt this run
    pub built: usize,

    /// Definitions skipped as up to date
    pub skipped: usize,

    /// Whether `index.json` was written
    pub index_written: bool,
}

/// Execute a full build run
///
/// `build_config_path` points at the build config JSON; source packages live
/// under `src/` next to it. Artifacts land in `out_dir`, which is created if
/// absent.
pub fn run(build_config_path: &Path, out_dir: &Path) -> BuildResult<RunSummary> {
    let build_config = BuildConfig::load(build_config_path)?;
    let config_dir = build_config_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .to_path_buf();

    fs::create_dir_all(out_dir)?;

    let mut cache = BuildCache::load(config_dir.join(CACHE_FILE_NAME))?;
    let definitions = resolve_packages(&config_dir, &build_config)?;

    info!("packages to check ({}):", definitions.len());
    for (index, definition) in definitions.iter().enumerate() {
        info!(
            "package {}: {} / {} ({} entries)",
            index + 1,
            definition.source_name,
            definition.distribution_name,
            definition.config.entries.len()
        );
    }

    let mut built = 0usize;
    let mut skipped = 0usize;

    for definition in &definitions {
        let base_dir = definition.source_dir(&config_dir);
        let fingerprint = directory_fingerprint(&base_dir)?;

        if cache.is_current(&definition.source_name, &fingerprint) {
            info!("package '{}' is up to date", definition.source_name);
            skipped += 1;
            continue;
        }

        info!("building package '{}'", definition.source_name);
        cache.record(&definition.source_name, fingerprint);
        build_package(definition, &base_dir, out_dir)?;
        built += 1;
    }

    let index_written = if build_config.generate_index {
        let index = generate_index(out_dir, &definitions)?;
        write_index(out_dir, &index)?;
        true
    } else {
        false
    };

    cache.flush()?;

    info!(
        "run complete: {built} built, {skipped} up to date, {} total",
        definitions.len()
    );

    Ok(RunSummary {
        definitions: definitions.len(),
        built,
        skipped,
        index_written,
    })
}
