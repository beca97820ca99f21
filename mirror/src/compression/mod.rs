//! Moving accounts between memory and the compressed-state tree.

pub mod bridge;
pub mod signer;

pub use bridge::{signature_hash, BridgeError, CompressedAccount, CompressionBridge};
pub use signer::HashSigner;
