//! Content addressing.
//!
//! An artifact's identifier is the lowercase hex SHA-256 digest of its
//! `content`, truncated to a configured number of characters. Identical
//! content always yields the identical id, so a second submission of the
//! same text lands on (and overwrites) the first record.

use sha2::{Digest, Sha256};

/// Length of a full SHA-256 digest in hex characters.
pub const FULL_HEX_LEN: usize = 64;

/// Default id length (first 16 hex characters, 64 bits of the digest).
pub const DEFAULT_HEX_LEN: usize = 16;

/// Shortest id length accepted by [`IdLength::new`].
pub const MIN_HEX_LEN: usize = 16;

/// Number of hex characters kept from the content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdLength(usize);

impl IdLength {
    /// Returns `None` unless `len` is within `MIN_HEX_LEN..=FULL_HEX_LEN`.
    pub fn new(len: usize) -> Option<Self> {
        (MIN_HEX_LEN..=FULL_HEX_LEN)
            .contains(&len)
            .then_some(Self(len))
    }

    pub fn full() -> Self {
        Self(FULL_HEX_LEN)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for IdLength {
    fn default() -> Self {
        Self(DEFAULT_HEX_LEN)
    }
}

/// Full lowercase hex SHA-256 digest of `content`.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derives the artifact id for `content`.
pub fn artifact_id(content: &str, len: IdLength) -> String {
    let mut hash = content_hash(content);
    hash.truncate(len.get());
    hash
}
