//! Zero-subtree tables.
//!
//! An empty tree of depth `d` has a well-defined root without materializing
//! `2^d` leaves: the empty leaf is `H(seed)`, and an empty subtree one level
//! up is the hash of two empty subtrees one level down. The program derives
//! the same chain from the same seed, so an untouched storage account and a
//! freshly built mirror agree on the root.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::crypto::{hashv, Hash};

/// Per-level hashes of empty subtrees, `depth + 1` entries.
///
/// `zero[0]` is the empty leaf and `zero[depth]` is the root of a tree with
/// nothing in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroSubtrees(Vec<Hash>);

impl ZeroSubtrees {
    /// Derive the table for a single seed.
    pub fn derive(seed: &[u8], depth: u8) -> Self {
        Self::derive_from_parts(&[seed], depth)
    }

    /// Derive the table for a seed given as several parts, hashed as their
    /// concatenation. The program seeds its trees this way
    /// (`[b"merkletree", name, vm]`).
    pub fn derive_from_parts(seed_parts: &[&[u8]], depth: u8) -> Self {
        let mut zeros = Vec::with_capacity(depth as usize + 1);
        let mut current = hashv(seed_parts);
        zeros.push(current);

        for _ in 0..depth {
            current = hashv(&[current.as_ref(), current.as_ref()]);
            zeros.push(current);
        }

        Self(zeros)
    }

    /// Rebuild a table from hashes read off the chain. Returns `None` unless
    /// every level is the self-hash of the level below.
    pub fn from_levels(levels: Vec<Hash>) -> Option<Self> {
        if levels.is_empty() {
            return None;
        }
        let consistent = levels
            .windows(2)
            .all(|pair| pair[1] == hashv(&[pair[0].as_ref(), pair[0].as_ref()]));
        consistent.then_some(Self(levels))
    }

    pub fn depth(&self) -> u8 {
        (self.0.len() - 1) as u8
    }

    pub fn get(&self, level: usize) -> Option<&Hash> {
        self.0.get(level)
    }

    pub fn empty_leaf(&self) -> Hash {
        self.0[0]
    }

    pub fn empty_root(&self) -> Hash {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[Hash] {
        &self.0
    }
}

impl Index<usize> for ZeroSubtrees {
    type Output = Hash;

    fn index(&self, level: usize) -> &Hash {
        &self.0[level]
    }
}
