//! Proofs, paths, and the sorted-pair hash.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::crypto::{hashv, sha256, Hash};

/// Sibling hashes from a leaf up to (not including) the root.
///
/// No direction bits: pairing is content-sorted, so the siblings alone are
/// enough to recompute the path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof(Vec<Hash>);

impl Proof {
    pub fn new(siblings: Vec<Hash>) -> Self {
        Self(siblings)
    }

    pub fn siblings(&self) -> &[Hash] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Hash> {
        self.0
    }
}

impl From<Vec<Hash>> for Proof {
    fn from(siblings: Vec<Hash>) -> Self {
        Self(siblings)
    }
}

impl Deref for Proof {
    type Target = [Hash];

    fn deref(&self) -> &[Hash] {
        &self.0
    }
}

/// Map a stored value to its leaf: `H(value)`.
pub fn as_leaf(value: &[u8]) -> Hash {
    sha256(value)
}

/// Hash two siblings, smaller one first.
///
/// Symmetric by construction: `hash_left_right(a, b) == hash_left_right(b, a)`.
pub fn hash_left_right(left: &Hash, right: &Hash) -> Hash {
    if left <= right {
        hashv(&[left.as_ref(), right.as_ref()])
    } else {
        hashv(&[right.as_ref(), left.as_ref()])
    }
}

/// Walk from `leaf` through every sibling in `proof`.
///
/// Returns `proof.len() + 1` hashes: the leaf first, the implied root last.
/// Nothing is checked here.
pub fn compute_path(proof: &[Hash], leaf: Hash) -> Vec<Hash> {
    let mut path = Vec::with_capacity(proof.len() + 1);
    let mut current = leaf;
    path.push(current);

    for sibling in proof {
        current = hash_left_right(&current, sibling);
        path.push(current);
    }

    path
}

pub(crate) fn is_valid_path(path: &[Hash], root: &Hash) -> bool {
    path.last().is_some_and(|top| top == root)
}

/// Returns `true` if `leaf` is proven to sit under `root` by `proof`.
///
/// Pure: no tree instance needed. This is the same check the program runs
/// before it lets an account out of compressed storage.
pub fn verify(proof: &[Hash], root: &Hash, leaf: &Hash) -> bool {
    is_valid_path(&compute_path(proof, *leaf), root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_left_right_is_order_independent() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        assert_eq!(hash_left_right(&a, &b), hash_left_right(&b, &a));
    }

    #[test]
    fn test_hash_left_right_puts_smaller_first() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        assert_eq!(hash_left_right(&hi, &lo), hashv(&[lo.as_ref(), hi.as_ref()]));
    }

    #[test]
    fn test_compute_path_length() {
        let leaf = sha256(b"leaf");
        let proof = vec![sha256(b"s1"), sha256(b"s2"), sha256(b"s3")];
        let path = compute_path(&proof, leaf);
        assert_eq!(path.len(), 4);
        assert_eq!(path[0], leaf);
        assert_eq!(path[1], hash_left_right(&leaf, &proof[0]));
    }

    #[test]
    fn test_verify_two_leaf_tree() {
        let a = as_leaf(b"a");
        let b = as_leaf(b"b");
        let root = hash_left_right(&a, &b);

        assert!(verify(&[b], &root, &a));
        assert!(verify(&[a], &root, &b));
        assert!(!verify(&[a], &root, &a));
    }

    #[test]
    fn test_empty_proof_only_proves_the_root_itself() {
        let root = sha256(b"root");
        assert!(verify(&[], &root, &root));
        assert!(!verify(&[], &root, &sha256(b"other")));
    }

    #[test]
    fn test_proof_derefs_to_slice() {
        let proof = Proof::from(vec![sha256(b"x")]);
        assert_eq!(proof.len(), 1);
        assert_eq!(proof.siblings()[0], sha256(b"x"));
        assert_eq!(proof.clone().into_inner(), vec![sha256(b"x")]);
    }
}
