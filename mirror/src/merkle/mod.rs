//! # Compressed State Tree
//!
//! A fixed-depth, append-only incremental Merkle tree, mirrored from the
//! VM's storage account.
//!
//! ```text
//! zeros.rs   zero-subtree table derived from the tree's seed
//! proof.rs   sorted-sibling hashing, path computation, pure verification
//! tree.rs    the tree itself: insert, proofs, replace/remove, snapshots
//! ```
//!
//! ## The one weird trick
//!
//! Siblings are hashed in *content* order, not position order: whichever of
//! the two hashes is lexicographically smaller goes first. A proof is then
//! just a list of siblings with no left/right flags, and the program checks
//! it the same way. It also means a root computed with position-ordered
//! hashing will never match, so don't "fix" it.

pub mod proof;
pub mod tree;
pub mod zeros;

pub use proof::{as_leaf, compute_path, hash_left_right, verify, Proof};
pub use tree::{MerkleError, MerkleTree, TreeSnapshot};
pub use zeros::ZeroSubtrees;
