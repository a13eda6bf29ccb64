//! Master key generation and storage obfuscation
//!
//! Every encrypted package carries a freshly generated 32-byte master key.
//! The key doubles as the archive password, so its bytes are restricted to
//! printable ASCII (`[0x20, 0x7E)`). This is a compatibility property of the
//! format, not a security feature; do not replace it with a stronger
//! generator without changing the format version.
//!
//! Before the key is written into the file it is XORed with a fixed 8-byte
//! repeating pattern. The pattern hides the password from casual hex dumps
//! and nothing more.

use rand::RngExt;

/// Master key length in bytes (not bits)
pub const MASTER_KEY_LENGTH: usize = 32;

/// Repeating XOR pattern applied to key bytes before storage
pub const KEY_XOR_PATTERN: [u8; 8] = [0x94, 0xce, 0xc3, 0xae, 0x73, 0xf9, 0xf1, 0xb9];

/// Generate a fresh master key of [`MASTER_KEY_LENGTH`] printable ASCII bytes
pub fn generate_master_key() -> Vec<u8> {
    let mut rng = rand::rng();
    (0..MASTER_KEY_LENGTH)
        .map(|_| rng.random_range(0x20u8..0x7E))
        .collect()
}

/// Obfuscate a key for storage
///
/// Each byte is XORed with [`KEY_XOR_PATTERN`] indexed by `byte_index % 8`.
/// Works for any key length.
pub fn obfuscate_key(key: &[u8]) -> Vec<u8> {
    key.iter()
        .enumerate()
        .map(|(i, b)| b ^ KEY_XOR_PATTERN[i % KEY_XOR_PATTERN.len()])
        .collect()
}

/// Reverse [`obfuscate_key`], recovering the raw key bytes
///
/// The transform is an XOR, so obfuscation and deobfuscation are the same
/// operation; this alias exists so call sites read correctly.
pub fn deobfuscate_key(stored: &[u8]) -> Vec<u8> {
    obfuscate_key(stored)
}
