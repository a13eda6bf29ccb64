//! Binary container format for `.mods` game content packages
//!
//! A `.mods` package is a small fixed header, an optional obfuscated master
//! key, and a ZIP payload that runs to the end of the file:
//!
//! ```text
//! offset 0x00: PackageHeader (20 bytes, little-endian)
//! offset 0x14: [u8; key_length]  obfuscated master key (encrypted packages only)
//! remaining:   ZIP archive payload (deflate, optionally WinZip AES-256)
//! ```
//!
//! # Components
//!
//! - [`PackageHeader`] - fixed-layout header with magic, encryption flag,
//!   compilation timestamp, and key length
//! - [`key`] - master key generation and the XOR storage obfuscation
//! - [`ArchiveWriter`] - capability trait for assembling the payload, with a
//!   ZIP-backed implementation ([`ZipArchiveWriter`])
//!
//! # Examples
//!
//! ```
//! use modpkg_format::{PackageHeader, HEADER_SIZE};
//!
//! let header = PackageHeader::unencrypted(1_700_000_000_000);
//! let bytes = header.encode();
//! assert_eq!(bytes.len(), HEADER_SIZE);
//! assert_eq!(PackageHeader::parse(&bytes).unwrap(), header);
//! ```

pub mod archive;
pub mod error;
pub mod header;
pub mod key;

pub use archive::{ArchiveWriter, ZipArchiveWriter};
pub use error::{FormatError, FormatResult};
pub use header::{HEADER_SIZE, MAGIC, PackageHeader};
pub use key::{KEY_XOR_PATTERN, MASTER_KEY_LENGTH, deobfuscate_key, generate_master_key, obfuscate_key};
