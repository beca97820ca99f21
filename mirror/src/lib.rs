// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Code VM Mirror: Core Library
//!
//! The Code VM keeps two pieces of state on-chain that everybody off-chain
//! eventually needs a copy of: the compressed-state Merkle tree (where cold
//! accounts go to sleep) and the paged account memory (where hot accounts
//! live). This crate mirrors both, byte for byte, so the backend can compute
//! roots and proofs, decode accounts straight out of an RPC dump, and build
//! the arguments for the next instruction without asking the chain first.
//!
//! ## Architecture
//!
//! Modules, leaves first:
//!
//! - **config**: Layout constants and capacity presets. The numbers here
//!   are pinned by the on-chain program, not by us.
//! - **crypto**: `Hash`/`Pubkey` value types, SHA-256 helpers, Ed25519.
//! - **merkle**: Zero-subtree tables and the incremental Merkle tree with
//!   sorted-sibling hashing.
//! - **account**: The tagged virtual-account codec (nonce, timelock, relay).
//! - **memory**: Paged slab memory: account index, sectors, linked pages.
//! - **compression**: Moves accounts from memory into the tree and back.
//!
//! ## Ground rules
//!
//! 1. Every byte layout is a wire format. If the program changes a field,
//!    this crate changes with it, not the other way around.
//! 2. Validate first, mutate second. A failed operation leaves no trace.
//! 3. Nothing in here is async. Share it behind a lock if you must.

pub mod account;
pub mod compression;
pub mod config;
pub mod crypto;
pub mod memory;
pub mod merkle;

pub use account::{CodecError, VirtualAccount, VirtualDurableNonce, VirtualRelayAccount, VirtualTimelockAccount};
pub use compression::{BridgeError, CompressionBridge, HashSigner};
pub use crypto::{Hash, Pubkey, Signature, VmKeypair};
pub use memory::{MemoryAllocator, MemoryConfig, MemoryError, MemoryLayout, PagedMemory, SimpleMemory};
pub use merkle::{verify, MerkleError, MerkleTree, Proof, TreeSnapshot, ZeroSubtrees};
