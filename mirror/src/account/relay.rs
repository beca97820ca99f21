use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, Pubkey};

/// A relay (proof) account: a commitment made against a recent relay root,
/// paying out to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualRelayAccount {
    pub address: Pubkey,
    pub commitment: Hash,
    pub recent_root: Hash,
    pub destination: Pubkey,
}

impl VirtualRelayAccount {
    /// The largest record, which is what sizes [`VirtualAccount::MAX_SIZE`].
    ///
    /// [`VirtualAccount::MAX_SIZE`]: super::VirtualAccount::MAX_SIZE
    pub const LEN: usize = 32 + 32 + 32 + 32;
}
