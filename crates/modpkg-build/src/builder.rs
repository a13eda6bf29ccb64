//! Package container assembly
//!
//! Builds one `.mods` artifact per [`PackageDefinition`]: the fixed header,
//! the obfuscated master key for encrypted packages, then the archive
//! payload. The output file is written incrementally; if a build aborts
//! midway the partial file is left in place and the next run rebuilds it,
//! since the failed run never flushes the cache.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use modpkg_format::{
    ArchiveWriter, PackageHeader, ZipArchiveWriter, generate_master_key, obfuscate_key,
};

use crate::config::PackageEntry;
use crate::error::{BuildError, BuildResult};
use crate::resolver::PackageDefinition;

/// Build the artifact for `definition` into `out_dir`
///
/// `base_dir` is the package source directory all entry `local_path`s are
/// relative to. Returns the path of the written artifact.
pub fn build_package(
    definition: &PackageDefinition,
    base_dir: &Path,
    out_dir: &Path,
) -> BuildResult<PathBuf> {
    let out_path = out_dir.join(definition.artifact_name());
    debug!(
        "writing '{}' ({} entries) to {}",
        definition.source_name,
        definition.config.entries.len(),
        out_path.display()
    );

    let mut file = File::create(&out_path)?;
    let timestamp = Utc::now().timestamp_millis();

    let master_key = definition
        .config
        .encrypt_files
        .then(generate_master_key);

    let header = match &master_key {
        Some(key) => PackageHeader::encrypted(timestamp, key.len() as i32),
        None => PackageHeader::unencrypted(timestamp),
    };
    header.write_to(&mut file)?;

    if let Some(key) = &master_key {
        file.write_all(&obfuscate_key(key))?;
    }

    let mut archive = ZipArchiveWriter::new(file);
    if let Some(key) = &master_key {
        archive.enable_encryption(key)?;
    }

    for entry in &definition.config.entries {
        add_entry(&mut archive, definition, entry, base_dir)?;
    }

    archive.save()?;
    Ok(out_path)
}

/// Add one manifest entry to the archive
fn add_entry<A: ArchiveWriter>(
    archive: &mut A,
    definition: &PackageDefinition,
    entry: &PackageEntry,
    base_dir: &Path,
) -> BuildResult<()> {
    match entry {
        PackageEntry::File {
            local_path,
            game_path,
        } => {
            // Readers expect an explicit directory member ahead of any file
            // below it.
            if let Some((parent, _)) = game_path.rsplit_once('/') {
                archive.add_directory(parent)?;
            }

            let path = base_dir.join(local_path);
            if !path.is_file() {
                return Err(BuildError::MissingFile {
                    package: definition.source_name.clone(),
                    path,
                });
            }
            let data = fs::read(&path)?;
            archive.add_file(game_path, &data)?;
        }
        PackageEntry::Directory {
            local_path,
            game_path,
        } => {
            let path = base_dir.join(local_path);
            if !path.is_dir() {
                return Err(BuildError::MissingDirectory {
                    package: definition.source_name.clone(),
                    path,
                });
            }
            archive.add_directory_tree(&path, game_path)?;
        }
    }
    Ok(())
}
