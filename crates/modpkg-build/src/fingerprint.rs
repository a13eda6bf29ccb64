//! Directory content fingerprinting
//!
//! A fingerprint summarizes the full recursive content and relative layout
//! of a package source directory. Files are enumerated recursively, sorted
//! by their `/`-normalized relative path with ordinal (byte) comparison, and
//! fed into one cumulative MD5: per file, the UTF-8 bytes of the lowercased
//! relative path immediately followed by the raw contents, no separators.
//! The digest is finalized after the last file and rendered as lowercase hex.
//!
//! The result is invariant to enumeration order, platform path separators,
//! and path case, and sensitive to file contents and relative-path renames.
//! A directory with no files yields [`EMPTY_FINGERPRINT`], which no real
//! digest can collide with.

use std::fs;
use std::io::Error as IoError;
use std::path::Path;

use md5::{Digest, Md5};
use walkdir::WalkDir;

use crate::error::BuildResult;

/// Sentinel fingerprint for a directory tree containing no files
pub const EMPTY_FINGERPRINT: &str = "";

/// Compute the content fingerprint of the tree rooted at `root`
///
/// # Errors
///
/// Any I/O failure while enumerating or reading files aborts with
/// [`crate::BuildError::Io`].
pub fn directory_fingerprint(root: &Path) -> BuildResult<String> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(IoError::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).map_err(IoError::other)?;
        let mut name = String::new();
        for component in relative.components() {
            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(&component.as_os_str().to_string_lossy());
        }
        files.push((name, entry.into_path()));
    }

    if files.is_empty() {
        return Ok(EMPTY_FINGERPRINT.to_string());
    }

    files.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut hasher = Md5::new();
    for (name, path) in &files {
        hasher.update(name.to_lowercase().as_bytes());
        hasher.update(&fs::read(path)?);
    }

    Ok(hex::encode(hasher.finalize()))
}
