//! # Incremental Merkle Tree
//!
//! The local mirror of a VM storage account's compressed-state tree.
//!
//! The on-chain side keeps only what it needs to append and to accept a
//! proof: the root, the next free index, and one "filled subtree" hash per
//! level. That's `O(depth)` state for a tree of `2^depth` leaves. The mirror
//! keeps exactly the same state, so roots agree byte for byte, plus a local
//! log of every leaf it has seen so it can produce proofs without asking
//! anyone.
//!
//! ## Proof generation
//!
//! Proofs are rebuilt from the leaf log by hashing layer after layer, padding
//! any odd layer with the zero hash for that level. That's `O(n)` per proof.
//! Fine for a mirror, nowhere near fine for a hot path. A tree restored from
//! a non-empty [`TreeSnapshot`] is missing the history the proofs are built
//! from, so it stops logging and can't produce proofs at all.
//!
//! ## Replacing leaves
//!
//! `replace_leaf` follows the program: check the old path against the root,
//! then swap in the new path, updating a filled subtree only where the old
//! path ran through it. Any failure happens before the first write, so a bad
//! proof never leaves the tree half-updated.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::proof::{as_leaf, compute_path, hash_left_right, is_valid_path, Proof};
use super::zeros::ZeroSubtrees;
use crate::config::MAX_TREE_DEPTH;
use crate::crypto::Hash;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("merkle tree is full: all {capacity} leaves are used")]
    TreeFull { capacity: u128 },

    #[error("invalid merkle proof for the current root")]
    InvalidProof,

    #[error("invalid proof length: expected {expected} siblings, got {got}")]
    InvalidProofLength { expected: usize, got: usize },

    #[error("leaf not found in the local leaf log")]
    LeafNotFound,

    #[error("invalid proof range: leaf {index} is past the until index {until}")]
    InvalidRange { index: u64, until: u64 },

    #[error("invalid tree depth {0}: must be between 1 and 64")]
    InvalidDepth(u8),

    #[error("invalid tree snapshot: {0}")]
    InvalidSnapshot(String),
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The on-chain portion of a tree's state: everything but the leaf log.
///
/// This is what a storage account actually holds. Serializes to JSON for
/// callers that persist the mirror between runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub depth: u8,
    pub root: Hash,
    pub next_index: u64,
    pub filled_subtrees: Vec<Hash>,
    pub zero_values: Vec<Hash>,
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    depth: u8,
    root: Hash,
    next_index: u64,
    filled_subtrees: Vec<Hash>,
    zero_values: ZeroSubtrees,
    leaves: Vec<Hash>,
    /// False once the log can no longer cover every leaf from index 0.
    logs_leaves: bool,
}

fn check_depth(depth: u8) -> Result<(), MerkleError> {
    if depth == 0 || depth > MAX_TREE_DEPTH {
        return Err(MerkleError::InvalidDepth(depth));
    }
    Ok(())
}

impl MerkleTree {
    /// Create an empty tree of `depth` levels seeded with `seed`.
    ///
    /// # Errors
    ///
    /// [`MerkleError::InvalidDepth`] unless `1 <= depth <= 64`.
    pub fn new(seed: &[u8], depth: u8) -> Result<Self, MerkleError> {
        Self::new_from_parts(&[seed], depth)
    }

    /// Like [`MerkleTree::new`], with the seed given as parts hashed in
    /// sequence.
    pub fn new_from_parts(seed_parts: &[&[u8]], depth: u8) -> Result<Self, MerkleError> {
        check_depth(depth)?;
        let zero_values = ZeroSubtrees::derive_from_parts(seed_parts, depth);
        Ok(Self::empty(zero_values))
    }

    fn empty(zero_values: ZeroSubtrees) -> Self {
        let depth = zero_values.depth();
        Self {
            depth,
            root: zero_values.empty_root(),
            next_index: 0,
            filled_subtrees: zero_values.as_slice()[..depth as usize].to_vec(),
            zero_values,
            leaves: Vec::new(),
            logs_leaves: true,
        }
    }

    /// Restore a tree from its on-chain state.
    ///
    /// The restored tree appends and accepts proofs exactly like the
    /// original, but has an empty leaf log.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Self, MerkleError> {
        check_depth(snapshot.depth)?;
        let depth = snapshot.depth as usize;

        if snapshot.filled_subtrees.len() != depth {
            return Err(MerkleError::InvalidSnapshot(format!(
                "{} filled subtrees for depth {}",
                snapshot.filled_subtrees.len(),
                depth
            )));
        }
        if snapshot.zero_values.len() != depth + 1 {
            return Err(MerkleError::InvalidSnapshot(format!(
                "{} zero values for depth {}",
                snapshot.zero_values.len(),
                depth
            )));
        }
        if u128::from(snapshot.next_index) > 1u128 << depth {
            return Err(MerkleError::InvalidSnapshot(format!(
                "next index {} exceeds capacity",
                snapshot.next_index
            )));
        }
        let zero_values = ZeroSubtrees::from_levels(snapshot.zero_values).ok_or_else(|| {
            MerkleError::InvalidSnapshot("zero values are not a self-hash chain".into())
        })?;

        Ok(Self {
            depth: snapshot.depth,
            root: snapshot.root,
            next_index: snapshot.next_index,
            filled_subtrees: snapshot.filled_subtrees,
            zero_values,
            leaves: Vec::new(),
            logs_leaves: snapshot.next_index == 0,
        })
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            depth: self.depth,
            root: self.root,
            next_index: self.next_index,
            filled_subtrees: self.filled_subtrees.clone(),
            zero_values: self.zero_values.as_slice().to_vec(),
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn root(&self) -> Hash {
        self.root
    }

    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// `2^depth`. A depth-64 tree doesn't fit in a `u64`, hence `u128`.
    pub fn capacity(&self) -> u128 {
        1u128 << self.depth
    }

    pub fn is_full(&self) -> bool {
        u128::from(self.next_index) >= self.capacity()
    }

    pub fn filled_subtrees(&self) -> &[Hash] {
        &self.filled_subtrees
    }

    pub fn zero_values(&self) -> &ZeroSubtrees {
        &self.zero_values
    }

    /// The hash standing in for "no leaf here".
    pub fn empty_leaf(&self) -> Hash {
        self.zero_values.empty_leaf()
    }

    /// Every leaf this instance has seen, in insertion order, with removed
    /// leaves showing as [`MerkleTree::empty_leaf`].
    pub fn leaves(&self) -> &[Hash] {
        &self.leaves
    }

    // -- Mutation ----------------------------------------------------------

    /// Append `H(value)` as the next leaf. Returns the new leaf count.
    ///
    /// # Errors
    ///
    /// [`MerkleError::TreeFull`] once `2^depth` leaves are in. The tree is
    /// untouched in that case.
    pub fn insert(&mut self, value: &[u8]) -> Result<u64, MerkleError> {
        self.append_leaf(as_leaf(value))
    }

    fn append_leaf(&mut self, leaf: Hash) -> Result<u64, MerkleError> {
        if self.is_full() {
            warn!(depth = self.depth, "insert rejected: tree is full");
            return Err(MerkleError::TreeFull {
                capacity: self.capacity(),
            });
        }

        let mut index = self.next_index;
        let mut current = leaf;

        for level in 0..self.depth as usize {
            let (left, right) = if index % 2 == 0 {
                self.filled_subtrees[level] = current;
                (current, self.zero_values[level])
            } else {
                (self.filled_subtrees[level], current)
            };
            current = hash_left_right(&left, &right);
            index /= 2;
        }

        self.root = current;
        if self.logs_leaves {
            self.leaves.push(leaf);
        }
        self.next_index += 1;

        debug!(
            index = self.next_index - 1,
            root = %self.root,
            "leaf inserted"
        );
        Ok(self.next_index)
    }

    /// Swap `old_leaf` for `new_leaf`, given a proof for `old_leaf` against
    /// the current root.
    ///
    /// # Errors
    ///
    /// - [`MerkleError::InvalidProofLength`] if the proof isn't `depth` long.
    /// - [`MerkleError::InvalidProof`] if it doesn't lead to the root.
    ///
    /// Either way nothing changes.
    pub fn replace_leaf(
        &mut self,
        proof: &[Hash],
        old_leaf: Hash,
        new_leaf: Hash,
    ) -> Result<(), MerkleError> {
        let depth = self.depth as usize;
        if proof.len() != depth {
            return Err(MerkleError::InvalidProofLength {
                expected: depth,
                got: proof.len(),
            });
        }

        let old_path = compute_path(proof, old_leaf);
        if !is_valid_path(&old_path, &self.root) {
            warn!(leaf = %old_leaf, root = %self.root, "proof does not match current root");
            return Err(MerkleError::InvalidProof);
        }

        let new_path = compute_path(proof, new_leaf);
        for level in 0..depth {
            if old_path[level] == self.filled_subtrees[level] {
                self.filled_subtrees[level] = new_path[level];
            }
        }
        self.root = new_path[depth];

        if let Some(slot) = self.leaves.iter_mut().find(|leaf| **leaf == old_leaf) {
            *slot = new_leaf;
        }

        debug!(old = %old_leaf, new = %new_leaf, root = %self.root, "leaf replaced");
        Ok(())
    }

    /// [`MerkleTree::replace_leaf`] taking raw values instead of leaves.
    pub fn replace(
        &mut self,
        proof: &[Hash],
        old_value: &[u8],
        new_value: &[u8],
    ) -> Result<(), MerkleError> {
        self.replace_leaf(proof, as_leaf(old_value), as_leaf(new_value))
    }

    /// Blank out `value`'s leaf, replacing it with the empty leaf.
    pub fn remove(&mut self, proof: &[Hash], value: &[u8]) -> Result<(), MerkleError> {
        let empty = self.empty_leaf();
        self.replace_leaf(proof, as_leaf(value), empty)
    }

    // -- Queries -----------------------------------------------------------

    /// Returns `true` if `proof` takes `H(value)` to the current root.
    pub fn contains(&self, proof: &[Hash], value: &[u8]) -> bool {
        self.contains_leaf(proof, as_leaf(value))
    }

    pub fn contains_leaf(&self, proof: &[Hash], leaf: Hash) -> bool {
        proof.len() == self.depth as usize && is_valid_path(&compute_path(proof, leaf), &self.root)
    }

    /// Proof for the first leaf equal to `H(value)`, against the current root.
    pub fn proof_for(&self, value: &[u8]) -> Result<Proof, MerkleError> {
        let leaf = as_leaf(value);
        let index = self
            .leaves
            .iter()
            .position(|candidate| *candidate == leaf)
            .ok_or(MerkleError::LeafNotFound)?;

        self.proof_for_index(index as u64, self.next_index)
    }

    /// Proof for the leaf at `index`, computed over the first `until + 1`
    /// logged leaves.
    ///
    /// With `until` below the current count the proof is against the root
    /// the tree had back then, which is how a client proves against a
    /// recent-but-not-latest root. An `until` past the end is clamped.
    ///
    /// An empty tree gets the zero table's first `depth` entries: the proof
    /// of an empty leaf in an empty tree.
    ///
    /// # Errors
    ///
    /// - [`MerkleError::InvalidRange`] if `index > until`.
    /// - [`MerkleError::LeafNotFound`] if `index` is past the leaf log, or
    ///   the tree was restored without one.
    pub fn proof_for_index(&self, index: u64, until: u64) -> Result<Proof, MerkleError> {
        if index > until {
            return Err(MerkleError::InvalidRange { index, until });
        }

        let depth = self.depth as usize;
        if self.next_index == 0 {
            return Ok(Proof::new(self.zero_values.as_slice()[..depth].to_vec()));
        }

        let index = usize::try_from(index).map_err(|_| MerkleError::LeafNotFound)?;
        if index >= self.leaves.len() {
            return Err(MerkleError::LeafNotFound);
        }

        let end = usize::try_from(until)
            .ok()
            .and_then(|until| until.checked_add(1))
            .map_or(self.leaves.len(), |end| end.min(self.leaves.len()));

        let mut layer: Vec<Hash> = self.leaves[..end].to_vec();
        let mut position = index;
        let mut siblings = Vec::with_capacity(depth);

        for level in 0..depth {
            if layer.len() % 2 != 0 {
                layer.push(self.zero_values[level]);
            }
            siblings.push(layer[position ^ 1]);

            layer = layer
                .chunks_exact(2)
                .map(|pair| hash_left_right(&pair[0], &pair[1]))
                .collect();
            position /= 2;
        }

        Ok(Proof::new(siblings))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256;
    use crate::merkle::proof::verify;

    fn tree(depth: u8) -> MerkleTree {
        MerkleTree::new(b"test-tree", depth).unwrap()
    }

    #[test]
    fn test_new_tree_is_all_zeros() {
        let t = MerkleTree::new(b"t", 3).unwrap();
        let zeros = ZeroSubtrees::derive(b"t", 3);

        assert_eq!(t.root(), zeros[3]);
        assert_eq!(t.filled_subtrees(), &zeros.as_slice()[..3]);
        assert_eq!(t.next_index(), 0);
        assert_eq!(t.empty_leaf(), sha256(b"t"));
    }

    #[test]
    fn test_invalid_depth() {
        assert_eq!(MerkleTree::new(b"t", 0), Err(MerkleError::InvalidDepth(0)));
        assert_eq!(MerkleTree::new(b"t", 65), Err(MerkleError::InvalidDepth(65)));
        assert!(MerkleTree::new(b"t", 64).is_ok());
    }

    #[test]
    fn test_insert_and_replace_structure() {
        // Depth 3, leaves a b c, then b -> z:
        //
        //            o
        //         m     n
        //       i  j   k  l
        //      a b c e f g h d        (e..h, d empty)
        let mut t = MerkleTree::new(b"t", 3).unwrap();
        let zero = t.zero_values().clone();

        let a = as_leaf(b"a");
        let b = as_leaf(b"b");
        let c = as_leaf(b"c");
        let z = as_leaf(b"z");

        t.insert(b"a").unwrap();
        t.insert(b"b").unwrap();
        t.insert(b"c").unwrap();

        let i = hash_left_right(&a, &b);
        let j = hash_left_right(&c, &zero[0]);
        let m = hash_left_right(&i, &j);
        let n = zero[2];
        assert_eq!(t.root(), hash_left_right(&m, &n));

        let proof = t.proof_for(b"b").unwrap();
        assert_eq!(proof.siblings(), &[a, j, n]);

        t.replace(&proof, b"b", b"z").unwrap();

        let i = hash_left_right(&a, &z);
        let m = hash_left_right(&i, &j);
        assert_eq!(t.root(), hash_left_right(&m, &n));
        assert_eq!(t.leaves(), &[a, z, c]);
        assert!(!t.contains(&proof, b"b"));
        assert!(t.contains(&t.proof_for(b"z").unwrap(), b"z"));
    }

    #[test]
    fn test_tree_full() {
        let mut t = tree(1);
        assert_eq!(t.insert(b"one"), Ok(1));
        assert_eq!(t.insert(b"two"), Ok(2));

        let before = t.clone();
        assert_eq!(t.insert(b"three"), Err(MerkleError::TreeFull { capacity: 2 }));
        assert_eq!(t, before);
        assert!(t.is_full());
    }

    #[test]
    fn test_every_leaf_provable_after_each_insert() {
        let mut t = tree(4);
        for n in 0..12u8 {
            t.insert(&[n]).unwrap();
            for k in 0..=n {
                let proof = t.proof_for(&[k]).unwrap();
                assert_eq!(proof.len(), 4);
                assert!(t.contains(&proof, &[k]), "leaf {k} after {n} inserts");
            }
        }
    }

    #[test]
    fn test_full_tree_proofs() {
        let mut t = tree(3);
        for n in 0..8u8 {
            t.insert(&[n]).unwrap();
        }
        for n in 0..8u8 {
            let proof = t.proof_for(&[n]).unwrap();
            assert!(verify(&proof, &t.root(), &as_leaf(&[n])));
        }
    }

    #[test]
    fn test_empty_tree_proof_is_zero_table() {
        let t = tree(5);
        let proof = t.proof_for_index(0, 0).unwrap();
        assert_eq!(proof.siblings(), &t.zero_values().as_slice()[..5]);
        assert!(t.contains_leaf(&proof, t.empty_leaf()));
    }

    #[test]
    fn test_proof_against_historical_root() {
        let mut t = tree(4);
        t.insert(b"first").unwrap();
        let early_root = t.root();
        t.insert(b"second").unwrap();
        t.insert(b"third").unwrap();

        let proof = t.proof_for_index(0, 0).unwrap();
        assert!(verify(&proof, &early_root, &as_leaf(b"first")));
        assert!(!verify(&proof, &t.root(), &as_leaf(b"first")));
    }

    #[test]
    fn test_proof_range_errors() {
        let mut t = tree(3);
        t.insert(b"x").unwrap();

        assert_eq!(
            t.proof_for_index(2, 1),
            Err(MerkleError::InvalidRange { index: 2, until: 1 })
        );
        assert_eq!(t.proof_for_index(4, 9), Err(MerkleError::LeafNotFound));
        assert_eq!(t.proof_for(b"never"), Err(MerkleError::LeafNotFound));
    }

    #[test]
    fn test_bad_proof_leaves_tree_untouched() {
        let mut t = tree(3);
        t.insert(b"a").unwrap();
        t.insert(b"b").unwrap();
        let before = t.clone();

        let bogus = vec![sha256(b"x"); 3];
        assert_eq!(t.remove(&bogus, b"a"), Err(MerkleError::InvalidProof));
        assert_eq!(t, before);

        let short = vec![sha256(b"x"); 2];
        assert_eq!(
            t.remove(&short, b"a"),
            Err(MerkleError::InvalidProofLength { expected: 3, got: 2 })
        );
        assert_eq!(t, before);
    }

    #[test]
    fn test_remove_then_keep_inserting() {
        let mut t = tree(3);
        t.insert(b"a").unwrap();
        t.insert(b"b").unwrap();

        let proof = t.proof_for(b"a").unwrap();
        t.remove(&proof, b"a").unwrap();
        assert_eq!(t.leaves()[0], t.empty_leaf());

        t.insert(b"c").unwrap();
        for value in [&b"b"[..], b"c"] {
            let proof = t.proof_for(value).unwrap();
            assert!(t.contains(&proof, value));
        }
    }

    #[test]
    fn test_contains_rejects_wrong_length() {
        let mut t = tree(3);
        t.insert(b"a").unwrap();
        let proof = t.proof_for(b"a").unwrap();
        assert!(!t.contains(&proof[..2], b"a"));
    }

    #[test]
    fn test_snapshot_restore_continues_identically() {
        let mut original = tree(6);
        for n in 0..5u8 {
            original.insert(&[n]).unwrap();
        }

        let mut restored = MerkleTree::from_snapshot(original.snapshot()).unwrap();
        assert_eq!(restored.root(), original.root());
        assert!(restored.leaves().is_empty());

        original.insert(b"next").unwrap();
        restored.insert(b"next").unwrap();
        assert_eq!(restored.root(), original.root());

        let proof = restored.proof_for(b"next");
        assert_eq!(proof, Err(MerkleError::LeafNotFound));
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut t = tree(4);
        t.insert(b"json").unwrap();
        let json = serde_json::to_string(&t.snapshot()).unwrap();
        let back: TreeSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t.snapshot());
    }

    #[test]
    fn test_snapshot_validation() {
        let t = tree(4);

        let mut bad = t.snapshot();
        bad.filled_subtrees.pop();
        assert!(matches!(
            MerkleTree::from_snapshot(bad),
            Err(MerkleError::InvalidSnapshot(_))
        ));

        let mut bad = t.snapshot();
        bad.zero_values[2] = sha256(b"tampered");
        assert!(matches!(
            MerkleTree::from_snapshot(bad),
            Err(MerkleError::InvalidSnapshot(_))
        ));

        let mut bad = t.snapshot();
        bad.next_index = 17;
        assert!(matches!(
            MerkleTree::from_snapshot(bad),
            Err(MerkleError::InvalidSnapshot(_))
        ));

        let mut bad = t.snapshot();
        bad.depth = 0;
        assert_eq!(MerkleTree::from_snapshot(bad), Err(MerkleError::InvalidDepth(0)));
    }

    #[test]
    fn test_multi_part_seed() {
        let a = MerkleTree::new_from_parts(&[b"merkletree", b"name", &[1u8; 32]], 8).unwrap();
        let mut joined = b"merkletreename".to_vec();
        joined.extend_from_slice(&[1u8; 32]);
        let b = MerkleTree::new(&joined, 8).unwrap();
        assert_eq!(a.root(), b.root());
    }
}
