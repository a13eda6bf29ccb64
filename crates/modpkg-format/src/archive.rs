//! Archive-writer capability for the package payload
//!
//! The payload of a `.mods` file is an ordinary ZIP archive appended after
//! the header (and key, when present). Package assembly only needs a small
//! surface from whatever archive library backs it, captured by the
//! [`ArchiveWriter`] trait:
//!
//! - add a single file member by archive path
//! - add an explicit directory member
//! - add a whole directory tree under a path prefix
//! - switch on the archive format's native strong encryption
//! - finalize the archive
//!
//! [`ZipArchiveWriter`] implements the trait with the `zip` crate: deflate
//! compression for file members and WinZip AES-256 when encryption is
//! enabled. Directory members are deduplicated, so adding the same directory
//! twice is a no-op.

use std::collections::HashSet;
use std::fs;
use std::io::{Error as IoError, Seek, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{AesMode, CompressionMethod, ZipWriter};

use crate::error::{FormatError, FormatResult};

/// Capability needed to assemble a package payload
///
/// `enable_encryption` applies to members added after the call; enable it
/// before adding any entries. `save` finalizes the archive; further adds
/// fail afterwards.
pub trait ArchiveWriter {
    /// Encrypt all subsequently added file members with `key` as password
    fn enable_encryption(&mut self, key: &[u8]) -> FormatResult<()>;

    /// Add an explicit directory member (idempotent)
    fn add_directory(&mut self, game_path: &str) -> FormatResult<()>;

    /// Add one file member at `game_path` with the given contents
    fn add_file(&mut self, game_path: &str, data: &[u8]) -> FormatResult<()>;

    /// Add the tree rooted at `local_dir` under the `game_path` prefix,
    /// preserving relative structure
    fn add_directory_tree(&mut self, local_dir: &Path, game_path: &str) -> FormatResult<()>;

    /// Finalize the archive
    fn save(&mut self) -> FormatResult<()>;
}

/// ZIP-backed [`ArchiveWriter`]
pub struct ZipArchiveWriter<W: Write + Seek> {
    writer: Option<ZipWriter<W>>,
    finished: Option<W>,
    password: Option<String>,
    directories: HashSet<String>,
}

/// File member options, optionally borrowing an encryption password
fn member_options(password: Option<&str>) -> FileOptions<'_, ()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    match password {
        Some(password) => options.with_aes_encryption(AesMode::Aes256, password),
        None => options,
    }
}

/// Directory members carry no data and are stored unencrypted
fn directory_options() -> FileOptions<'static, ()> {
    FileOptions::default().compression_method(CompressionMethod::Stored)
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    /// Create a writer producing the archive into `inner`, starting at its
    /// current position
    pub fn new(inner: W) -> Self {
        Self {
            writer: Some(ZipWriter::new(inner)),
            finished: None,
            password: None,
            directories: HashSet::new(),
        }
    }

    /// Recover the underlying writer after a successful [`ArchiveWriter::save`]
    pub fn into_inner(self) -> Option<W> {
        self.finished
    }

    fn writer(&mut self) -> FormatResult<&mut ZipWriter<W>> {
        self.writer
            .as_mut()
            .ok_or_else(|| FormatError::Io(IoError::other("archive already saved")))
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchiveWriter<W> {
    fn enable_encryption(&mut self, key: &[u8]) -> FormatResult<()> {
        if let Some((index, &value)) = key
            .iter()
            .enumerate()
            .find(|&(_, &b)| !(0x20..0x7F).contains(&b))
        {
            return Err(FormatError::KeyNotAscii { index, value });
        }
        // printable ASCII only, checked above
        self.password = Some(key.iter().map(|&b| b as char).collect());
        Ok(())
    }

    fn add_directory(&mut self, game_path: &str) -> FormatResult<()> {
        let mut name = game_path.to_string();
        if !name.ends_with('/') {
            name.push('/');
        }
        if !self.directories.insert(name.clone()) {
            return Ok(());
        }
        self.writer()?.add_directory(name, directory_options())?;
        Ok(())
    }

    fn add_file(&mut self, game_path: &str, data: &[u8]) -> FormatResult<()> {
        let password = self.password.clone();
        let options = member_options(password.as_deref());
        let writer = self.writer()?;
        writer.start_file(game_path, options)?;
        writer.write_all(data)?;
        Ok(())
    }

    fn add_directory_tree(&mut self, local_dir: &Path, game_path: &str) -> FormatResult<()> {
        self.add_directory(game_path)?;

        for entry in WalkDir::new(local_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| FormatError::Io(IoError::from(e)))?;
            let relative = entry
                .path()
                .strip_prefix(local_dir)
                .map_err(IoError::other)?;
            let member = prefixed_name(game_path, relative);

            if entry.file_type().is_dir() {
                self.add_directory(&member)?;
            } else {
                let data = fs::read(entry.path())?;
                self.add_file(&member, &data)?;
            }
        }
        Ok(())
    }

    fn save(&mut self) -> FormatResult<()> {
        if let Some(writer) = self.writer.take() {
            self.finished = Some(writer.finish()?);
        }
        Ok(())
    }
}

/// Join a game-path prefix and a filesystem-relative path into a `/`-separated
/// archive member name
fn prefixed_name(prefix: &str, relative: &Path) -> String {
    let mut name = prefix.trim_end_matches('/').to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}
