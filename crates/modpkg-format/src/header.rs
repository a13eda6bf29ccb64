//! Fixed-layout package header
//!
//! The header sits at the start of every `.mods` file. The layout mirrors a
//! 4-byte-aligned packed struct so that readers in other languages can map it
//! directly:
//!
//! ```text
//! offset 0x00: u32 magic                 (0x4459495A)
//! offset 0x04: u8  encryption_enabled    (0 or 1, followed by 3 padding bytes)
//! offset 0x08: i64 compilation_timestamp (unix milliseconds)
//! offset 0x10: i32 key_length            (obfuscated key bytes after header, 0 if unencrypted)
//! ```
//!
//! All fields are little-endian. Total size is 20 bytes.

use std::io::Write;

use crate::error::{FormatError, FormatResult};

/// Package magic value, first four bytes of every `.mods` file
pub const MAGIC: u32 = 0x4459495A;

/// Encoded header size in bytes
pub const HEADER_SIZE: usize = 20;

/// Fixed-layout `.mods` package header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageHeader {
    /// Whether the payload entries are encrypted
    pub encryption_enabled: bool,

    /// Build time in unix milliseconds
    pub compilation_timestamp: i64,

    /// Length in bytes of the obfuscated key following the header (0 when
    /// encryption is disabled)
    pub key_length: i32,
}

impl PackageHeader {
    /// Create a header for an unencrypted package
    pub fn unencrypted(compilation_timestamp: i64) -> Self {
        Self {
            encryption_enabled: false,
            compilation_timestamp,
            key_length: 0,
        }
    }

    /// Create a header for an encrypted package carrying a key of `key_length` bytes
    pub fn encrypted(compilation_timestamp: i64, key_length: i32) -> Self {
        Self {
            encryption_enabled: true,
            compilation_timestamp,
            key_length,
        }
    }

    /// Encode the header into its fixed 20-byte layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        buf[4] = u8::from(self.encryption_enabled);
        // bytes 5..8 stay zero (alignment padding)
        buf[8..16].copy_from_slice(&self.compilation_timestamp.to_le_bytes());
        buf[16..20].copy_from_slice(&self.key_length.to_le_bytes());
        buf
    }

    /// Write the encoded header to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> FormatResult<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    /// Parse a header from raw data
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TruncatedHeader`] if fewer than 20 bytes are
    /// available, [`FormatError::InvalidMagic`] on a wrong magic value, and
    /// [`FormatError::InvalidKeyLength`] if the key length is negative.
    pub fn parse(data: &[u8]) -> FormatResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(FormatError::TruncatedHeader {
                actual: data.len(),
                needed: HEADER_SIZE,
            });
        }

        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic(magic));
        }

        let encryption_enabled = data[4] != 0;
        let compilation_timestamp = i64::from_le_bytes([
            data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
        ]);
        let key_length = i32::from_le_bytes([data[16], data[17], data[18], data[19]]);
        if key_length < 0 {
            return Err(FormatError::InvalidKeyLength(key_length));
        }

        Ok(Self {
            encryption_enabled,
            compilation_timestamp,
            key_length,
        })
    }
}
