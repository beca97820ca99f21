//! # Compression Bridge
//!
//! Moves accounts out of memory into the compressed-state tree, and back.
//!
//! ## Compress
//!
//! ```text
//! record  = memory[index]                  (decoded, then re-packed)
//! h       = H(pack(record))
//! sig     = authority.sign(h)
//! tree.insert(H(sig ‖ h))                  leaf is H(H(sig ‖ h))
//! memory.free(index)
//! ```
//!
//! The tree only ever sees a hash of a hash, so nothing about the account
//! leaks. To get it back you need the record itself and the signature,
//! which is why the bridge keeps `h -> (record, sig)` on the side.
//!
//! ## Decompress
//!
//! The reverse, with every check done before the first write: target slot
//! free and big enough, signature still valid for the authority, proof
//! valid against the current root. Then the leaf is blanked, the record is
//! written and the side entry dropped. A bad proof changes nothing.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use super::signer::HashSigner;
use crate::account::{CodecError, VirtualAccount};
use crate::crypto::{hashv, sha256, verify, Hash, Signature};
use crate::memory::{MemoryAllocator, MemoryError, PagedMemory};
use crate::merkle::{MerkleError, MerkleTree, Proof};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("no compressed account with hash {0}")]
    NotCompressed(Hash),

    #[error("authority signature over {0} does not verify")]
    SignatureRejected(Hash),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// What the bridge remembers about an account it compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedAccount {
    pub account: VirtualAccount,
    pub signature: Signature,
}

/// The value inserted into the tree for account hash `hash`.
pub fn signature_hash(signature: &Signature, hash: &Hash) -> Hash {
    hashv(&[signature.as_ref(), hash.as_ref()])
}

pub struct CompressionBridge<S, M = PagedMemory> {
    tree: MerkleTree,
    memory: M,
    signer: S,
    compressed: HashMap<Hash, CompressedAccount>,
}

impl<S: HashSigner, M: MemoryAllocator> CompressionBridge<S, M> {
    pub fn new(tree: MerkleTree, memory: M, signer: S) -> Self {
        Self {
            tree,
            memory,
            signer,
            compressed: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Direct access to memory, for loading accounts before compressing.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn compressed(&self, hash: &Hash) -> Option<&CompressedAccount> {
        self.compressed.get(hash)
    }

    pub fn compressed_count(&self) -> usize {
        self.compressed.len()
    }

    pub fn into_parts(self) -> (MerkleTree, M) {
        (self.tree, self.memory)
    }

    /// Compress the account at `index`. Returns its hash, which is the
    /// handle for [`CompressionBridge::decompress`].
    ///
    /// # Errors
    ///
    /// Slot empty or undecodable, or tree full. Memory and tree are
    /// unchanged in every case.
    pub fn compress(&mut self, index: u16) -> Result<Hash, BridgeError> {
        let account = self.memory.read_account(index)?;
        let hash = sha256(&account.pack()?);
        let signature = self.signer.sign_hash(&hash);

        self.tree.insert(signature_hash(&signature, &hash).as_ref())?;
        self.memory.free(index)?;
        self.compressed
            .insert(hash, CompressedAccount { account, signature });

        info!(
            index,
            %hash,
            variant = %account.variant(),
            next_index = self.tree.next_index(),
            "account compressed"
        );
        Ok(hash)
    }

    /// Decompress `hash` into `into_index`, proving membership with a proof
    /// built from the local leaf log.
    pub fn decompress(&mut self, hash: &Hash, into_index: u16) -> Result<(), BridgeError> {
        let entry = self.entry(hash)?;
        let proof = self
            .tree
            .proof_for(signature_hash(&entry.signature, hash).as_ref())?;
        self.decompress_with_proof(hash, into_index, &proof)
    }

    /// Decompress `hash` into `into_index` with a caller-supplied proof
    /// against the current root.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotCompressed`] for a hash this bridge never
    ///   compressed, or already decompressed.
    /// - [`BridgeError::Memory`] if the target slot is taken or too small.
    /// - [`BridgeError::SignatureRejected`] if the stored signature no
    ///   longer verifies.
    /// - [`BridgeError::Merkle`] for a proof that doesn't hold.
    ///
    /// Nothing changes on any error.
    pub fn decompress_with_proof(
        &mut self,
        hash: &Hash,
        into_index: u16,
        proof: &Proof,
    ) -> Result<(), BridgeError> {
        let entry = self.entry(hash)?;
        let packed = entry.account.pack()?;

        self.memory.check_index(into_index)?;
        if self.memory.has_item(into_index) {
            return Err(MemoryError::SlotOccupied(into_index).into());
        }
        if !self.memory.has_room_for(packed.len()) {
            return Err(MemoryError::OutOfSpace { size: packed.len() }.into());
        }

        if !verify(&self.signer.public_key(), hash.as_ref(), &entry.signature) {
            warn!(%hash, "stored signature rejected by authority key");
            return Err(BridgeError::SignatureRejected(*hash));
        }

        let value = signature_hash(&entry.signature, hash);
        if let Err(err) = self.tree.remove(proof, value.as_ref()) {
            warn!(%hash, error = %err, "decompress proof rejected");
            return Err(err.into());
        }
        self.memory.write(into_index, &packed)?;
        self.compressed.remove(hash);

        info!(into_index, %hash, root = %self.tree.root(), "account decompressed");
        Ok(())
    }

    fn entry(&self, hash: &Hash) -> Result<CompressedAccount, BridgeError> {
        self.compressed
            .get(hash)
            .copied()
            .ok_or(BridgeError::NotCompressed(*hash))
    }
}
