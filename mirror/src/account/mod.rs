//! # Virtual Accounts
//!
//! The records the VM keeps for its users, and their binary codec.
//!
//! Each record type has a fixed length with no padding, and the tagged
//! union [`VirtualAccount`] puts a one-byte variant tag in front:
//!
//! ```text
//! tag 0  Nonce     address:32 nonce:32                               (64)
//! tag 1  Timelock  owner:32 nonce:32 token_bump:1 unlock_bump:1
//!                  receipt_bump:1 balance:8 (LE) bump:1              (76)
//! tag 2  Relay     address:32 commitment:32 recent_root:32
//!                  destination:32                                   (128)
//! ```
//!
//! Payloads go through bincode's default options: fixed-width integers,
//! little-endian, no length prefix for arrays. For these structs that is
//! exactly the layout above, and the tests pin it down.

pub mod nonce;
pub mod relay;
pub mod timelock;
pub mod virtual_account;

pub use nonce::VirtualDurableNonce;
pub use relay::VirtualRelayAccount;
pub use timelock::VirtualTimelockAccount;
pub use virtual_account::{AccountVariant, CodecError, VirtualAccount};
