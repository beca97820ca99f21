//! Virtual timelock accounts.
//!
//! The bumps are the PDA bump seeds the program needs to re-derive the real
//! timelock, vault, unlock and receipt addresses. The mirror only stores
//! them; deriving the addresses is the program's business.

use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, Pubkey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualTimelockAccount {
    pub owner: Pubkey,
    pub nonce: Hash,

    pub token_bump: u8,
    pub unlock_bump: u8,
    pub receipt_bump: u8,

    /// Token balance in the mint's base units.
    pub balance: u64,
    pub bump: u8,
}

impl VirtualTimelockAccount {
    pub const LEN: usize = 32 + 32 + 1 + 1 + 1 + 8 + 1;
}
