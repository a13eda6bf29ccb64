//! Container format error types

use thiserror::Error;

/// Errors raised while encoding, parsing, or assembling a `.mods` container
#[derive(Debug, Error)]
pub enum FormatError {
    /// Invalid package magic value
    #[error("invalid package magic: expected 0x4459495A, got {0:#010X}")]
    InvalidMagic(u32),

    /// Header data shorter than the fixed layout
    #[error("package header truncated: got {actual} bytes, need {needed}")]
    TruncatedHeader {
        /// Bytes available
        actual: usize,
        /// Bytes required by the fixed layout
        needed: usize,
    },

    /// Header declares a negative key length
    #[error("invalid key length in header: {0}")]
    InvalidKeyLength(i32),

    /// Master key contains bytes outside the printable ASCII range
    ///
    /// The archive password is the raw key interpreted as an ASCII string,
    /// so every byte must stay within `[0x20, 0x7E)`.
    #[error("master key byte {value:#04X} at index {index} is not printable ASCII")]
    KeyNotAscii {
        /// Offending byte position
        index: usize,
        /// Offending byte value
        value: u8,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP payload error
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type for container format operations
pub type FormatResult<T> = Result<T, FormatError>;
