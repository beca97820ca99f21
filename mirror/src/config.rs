//! # Layout Constants & Capacity Presets
//!
//! Every magic number the mirror depends on lives here. Almost none of them
//! are ours to choose: they are copied from the on-chain program, and if the
//! two disagree, the program wins and this file gets a very awkward commit.

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// SHA-256 digest length. Every tree node, every record hash, every seed
/// derivation is exactly this wide.
pub const HASH_BYTES: usize = 32;

/// Ed25519 public key length in bytes.
pub const PUBKEY_BYTES: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Compressed State (Merkle tree)
// ---------------------------------------------------------------------------

/// Depth of the VM's compressed-state tree. 2^24 cold accounts per storage
/// account before it fills up.
pub const COMPRESSED_STATE_DEPTH: u8 = 24;

/// Depth of the relay commitment tree.
pub const RELAY_STATE_DEPTH: u8 = 64;

/// Deepest tree we can index with a `u64` leaf counter.
pub const MAX_TREE_DEPTH: u8 = 64;

/// Seed prefix the program mixes into every tree it creates.
pub const MERKLE_TREE_SEED: &[u8] = b"merkletree";

// ---------------------------------------------------------------------------
// Paged Memory
// ---------------------------------------------------------------------------

/// Pages per sector. Page references are a single byte and 0 doubles as the
/// end-of-chain marker, so 255 is the ceiling.
pub const NUM_PAGES: usize = 255;

/// Page payload size for mixed-layout memory accounts.
pub const MIXED_PAGE_SIZE: usize = 32;

/// Slot count of the memory accounts the program currently deploys.
pub const TEST_MAX_ACCOUNTS: usize = 100;

/// Sector count of the memory accounts the program currently deploys.
pub const TEST_NUM_SECTORS: usize = 2;

/// Slot count the program is sized for once memory accounts can be resized
/// to full capacity. `AccountIndex` lookups are `u16`.
pub const PRODUCTION_MAX_ACCOUNTS: usize = 65_535;

/// Sector count at full capacity. Sector references are a single byte.
pub const PRODUCTION_NUM_SECTORS: usize = 255;

/// Longest memory account name, padded with NULs on-chain.
pub const MAX_NAME_LEN: usize = 32;

/// Bytes in front of the slab in a memory account:
/// discriminator (8) + vm (32) + bump (1) + name (32) + layout (1).
pub const MEMORY_HEADER_LEN: usize = 8 + PUBKEY_BYTES + 1 + MAX_NAME_LEN + 1;
