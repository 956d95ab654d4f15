use sha2::{Digest, Sha256};

/// TSV parsing constants
pub const TSV_WORD_LEVEL: u32 = 5;
pub const TSV_MIN_FIELDS: usize = 11;

/// Hex digits kept from a SHA-256 digest when it is used as a cache key.
const KEY_HEX_DIGITS: usize = 16;

/// 16-hex-digit key identifying a document by its bytes, stable across processes.
pub fn document_key(bytes: &[u8]) -> String {
    digest_key(Sha256::digest(bytes))
}

/// Truncate a digest to a cache key.
pub(crate) fn digest_key(digest: impl std::fmt::LowerHex) -> String {
    let mut key = format!("{:x}", digest);
    key.truncate(KEY_HEX_DIGITS);
    key
}
