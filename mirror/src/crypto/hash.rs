//! # Hashing Utilities
//!
//! SHA-256, and the 32-byte [`Hash`] value type that every other module in
//! this crate passes around.
//!
//! The program hashes multi-part inputs by feeding each part into the same
//! hasher (`hashv`), which is identical to hashing the concatenation. We do
//! the same so that "hash of signature then hash" means the exact bytes the
//! chain hashed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::config::HASH_BYTES;

/// Errors when building a [`Hash`] from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex encoding")]
    InvalidHex,
}

/// A 32-byte SHA-256 digest.
///
/// Ordering is plain lexicographic byte order, which is exactly the order
/// the Merkle tree uses to decide which sibling is hashed first. Serializes
/// as its raw 32 bytes under bincode, so it can sit inside wire structs.
///
/// Displays as base58 because that's what every explorer and every log line
/// on the other side of the RPC uses.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Hash([u8; HASH_BYTES]);

impl Hash {
    pub const LEN: usize = HASH_BYTES;

    /// Wrap a fixed-size array. `const` so zero tables and test vectors can
    /// be declared statically.
    pub const fn new_from_array(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }

    /// Copy a hash out of a slice. Fails unless the slice is exactly 32 bytes.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let array: [u8; HASH_BYTES] = bytes
            .try_into()
            .map_err(|_| HashError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Parse a hex string (no `0x` prefix).
    pub fn from_hex(hex_str: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(hex_str).map_err(|_| HashError::InvalidHex)?;
        Self::try_from_slice(&bytes)
    }

    pub fn to_bytes(self) -> [u8; HASH_BYTES] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; HASH_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; HASH_BYTES]> for Hash {
    fn from(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for [u8; HASH_BYTES] {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", bs58::encode(self.0).into_string())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

/// Compute the SHA-256 hash of `data`.
///
/// # Example
///
/// ```
/// use code_vm_mirror::crypto::sha256;
///
/// let hash = sha256(b"code vm");
/// assert_eq!(hash.as_ref().len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Hash {
    hashv(&[data])
}

/// Hash several byte slices as if they were concatenated, without
/// allocating the concatenation.
pub fn hashv(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}
