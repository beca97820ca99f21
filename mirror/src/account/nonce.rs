use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, Pubkey};

/// A virtual durable nonce: an address and the blockhash-like value it
/// currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDurableNonce {
    pub address: Pubkey,
    pub nonce: Hash,
}

impl VirtualDurableNonce {
    pub const LEN: usize = 32 + 32;
}
