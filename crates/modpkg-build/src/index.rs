//! Build index generation
//!
//! After a run, the index lists every processed artifact with its SHA-256
//! checksum and byte size so a downstream distribution system can verify and
//! serve the files. SHA-256 is deliberately a different digest from the MD5
//! used for source fingerprints; the two never mix.

use std::fs::{self, File};
use std::io::{BufReader, Error as IoError};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{BuildError, BuildResult};
use crate::resolver::PackageDefinition;

/// Index file name inside the output directory
pub const INDEX_FILE_NAME: &str = "index.json";

/// One produced artifact in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIndexEntry {
    /// Artifact file name, `<distribution_name>.mods`
    pub name: String,

    /// Lowercase hex SHA-256 of the artifact bytes
    pub checksum: String,

    /// Artifact size in bytes
    pub size: u64,
}

/// Manifest of one run's artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildIndex {
    /// Run timestamp
    pub built_at: DateTime<Utc>,

    /// One entry per processed package definition, in processing order
    pub entries: Vec<BuildIndexEntry>,
}

/// Collect checksums and sizes for every definition's artifact
///
/// Skipped packages are included too; their artifacts come from an earlier
/// run. A missing artifact means an upstream stage never produced it.
pub fn generate_index(
    out_dir: &Path,
    definitions: &[PackageDefinition],
) -> BuildResult<BuildIndex> {
    let mut entries = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let name = definition.artifact_name();
        let path = out_dir.join(&name);
        if !path.is_file() {
            return Err(BuildError::MissingArtifact { path });
        }

        let checksum = sha256_file(&path)?;
        let size = fs::metadata(&path)?.len();
        entries.push(BuildIndexEntry {
            name,
            checksum,
            size,
        });
    }

    Ok(BuildIndex {
        built_at: Utc::now(),
        entries,
    })
}

/// Write the index to `<out_dir>/index.json`, returning the path
pub fn write_index(out_dir: &Path, index: &BuildIndex) -> BuildResult<PathBuf> {
    let path = out_dir.join(INDEX_FILE_NAME);
    let text = serde_json::to_string_pretty(index).map_err(IoError::other)?;
    fs::write(&path, text)?;
    info!("wrote build index with {} entries", index.entries.len());
    Ok(path)
}

/// Lowercase hex SHA-256 of a file's contents, streamed
fn sha256_file(path: &Path) -> BuildResult<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
