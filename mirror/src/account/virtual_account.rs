//! The tagged account union and its codec.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::{VirtualDurableNonce, VirtualRelayAccount, VirtualTimelockAccount};
use crate::crypto::{sha256, Hash};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors decoding or encoding a [`VirtualAccount`].
///
/// A failed decode never produces a partial record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty account data")]
    Empty,

    #[error("unknown virtual account variant {0}")]
    UnknownVariant(u8),

    #[error("truncated {variant} payload: expected {expected} bytes, got {got}")]
    Truncated {
        variant: AccountVariant,
        expected: usize,
        got: usize,
    },

    #[error("account serialization failed: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// AccountVariant
// ---------------------------------------------------------------------------

/// The one-byte tag in front of every packed account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccountVariant {
    Nonce = 0,
    Timelock = 1,
    Relay = 2,
}

impl AccountVariant {
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Length of the payload that follows the tag.
    pub fn payload_len(self) -> usize {
        match self {
            Self::Nonce => VirtualDurableNonce::LEN,
            Self::Timelock => VirtualTimelockAccount::LEN,
            Self::Relay => VirtualRelayAccount::LEN,
        }
    }
}

impl TryFrom<u8> for AccountVariant {
    type Error = CodecError;

    fn try_from(tag: u8) -> Result<Self, CodecError> {
        match tag {
            0 => Ok(Self::Nonce),
            1 => Ok(Self::Timelock),
            2 => Ok(Self::Relay),
            other => Err(CodecError::UnknownVariant(other)),
        }
    }
}

impl fmt::Display for AccountVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nonce => write!(f, "nonce"),
            Self::Timelock => write!(f, "timelock"),
            Self::Relay => write!(f, "relay"),
        }
    }
}

// ---------------------------------------------------------------------------
// VirtualAccount
// ---------------------------------------------------------------------------

/// Any account the VM can hold in memory or compress into its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualAccount {
    Nonce(VirtualDurableNonce),
    Timelock(VirtualTimelockAccount),
    Relay(VirtualRelayAccount),
}

impl VirtualAccount {
    /// Largest packed size of any variant (relay).
    pub const MAX_SIZE: usize = 1 + VirtualRelayAccount::LEN;

    pub fn variant(&self) -> AccountVariant {
        match self {
            Self::Nonce(_) => AccountVariant::Nonce,
            Self::Timelock(_) => AccountVariant::Timelock,
            Self::Relay(_) => AccountVariant::Relay,
        }
    }

    /// Packed size: tag plus payload.
    pub fn get_size(&self) -> usize {
        1 + self.variant().payload_len()
    }

    /// `tag ‖ payload`, always exactly [`VirtualAccount::get_size`] bytes.
    pub fn pack(&self) -> Result<Vec<u8>, CodecError> {
        let payload = match self {
            Self::Nonce(account) => encode_payload(account, VirtualDurableNonce::LEN)?,
            Self::Timelock(account) => encode_payload(account, VirtualTimelockAccount::LEN)?,
            Self::Relay(account) => encode_payload(account, VirtualRelayAccount::LEN)?,
        };

        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(self.variant().tag());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode `tag ‖ payload`. Bytes past the variant's length are ignored,
    /// since memory pages hand back whole chunks.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Empty`] for zero-length input.
    /// - [`CodecError::UnknownVariant`] for a tag other than 0, 1 or 2.
    /// - [`CodecError::Truncated`] if the payload is too short.
    pub fn unpack(data: &[u8]) -> Result<Self, CodecError> {
        let (&tag, payload) = data.split_first().ok_or(CodecError::Empty)?;
        let variant = AccountVariant::try_from(tag)?;

        let expected = variant.payload_len();
        if payload.len() < expected {
            return Err(CodecError::Truncated {
                variant,
                expected,
                got: payload.len(),
            });
        }
        let payload = &payload[..expected];

        Ok(match variant {
            AccountVariant::Nonce => Self::Nonce(decode_payload(payload)?),
            AccountVariant::Timelock => Self::Timelock(decode_payload(payload)?),
            AccountVariant::Relay => Self::Relay(decode_payload(payload)?),
        })
    }

    /// SHA-256 of the packed form. This is the hash the VM authority signs
    /// when the account is compressed.
    pub fn get_hash(&self) -> Result<Hash, CodecError> {
        Ok(sha256(&self.pack()?))
    }

    pub fn into_inner_nonce(self) -> Option<VirtualDurableNonce> {
        match self {
            Self::Nonce(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn into_inner_timelock(self) -> Option<VirtualTimelockAccount> {
        match self {
            Self::Timelock(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn into_inner_relay(self) -> Option<VirtualRelayAccount> {
        match self {
            Self::Relay(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<VirtualDurableNonce> for VirtualAccount {
    fn from(account: VirtualDurableNonce) -> Self {
        Self::Nonce(account)
    }
}

impl From<VirtualTimelockAccount> for VirtualAccount {
    fn from(account: VirtualTimelockAccount) -> Self {
        Self::Timelock(account)
    }
}

impl From<VirtualRelayAccount> for VirtualAccount {
    fn from(account: VirtualRelayAccount) -> Self {
        Self::Relay(account)
    }
}

fn encode_payload<T: Serialize>(account: &T, len: usize) -> Result<Vec<u8>, CodecError> {
    let bytes = bincode::serialize(account)?;
    if bytes.len() != len {
        return Err(CodecError::Serialization(format!(
            "encoded {} bytes, layout is {}",
            bytes.len(),
            len
        )));
    }
    Ok(bytes)
}

fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, CodecError> {
    Ok(bincode::deserialize(payload)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
