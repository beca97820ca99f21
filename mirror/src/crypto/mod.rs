//! # Cryptographic Primitives
//!
//! Two hash-sized value types and the two algorithms the VM uses:
//!
//! - **SHA-256** for every tree node and record hash. The program computes
//!   these with the `sol_sha256` syscall, so there is no room for a faster
//!   hash here. We match the chain or we are useless.
//! - **Ed25519** for the VM authority's signature over an account before it
//!   is compressed.
//!
//! Everything is a thin wrapper around `sha2` and `ed25519-dalek`. Don't
//! roll your own.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{hashv, sha256, Hash, HashError};
pub use keys::{KeyError, Pubkey, Signature, VmKeypair};
pub use signatures::{sign, verify, verify_raw, SignatureError};
