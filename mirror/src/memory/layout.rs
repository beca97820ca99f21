//! Memory layouts.
//!
//! A memory account is created for one kind of record, or for a mix. The
//! layout fixes the page size: single-kind accounts get pages exactly one
//! packed record wide, so every record is a one-page chain; mixed accounts
//! use small pages and chain as many as each record needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MemoryError;
use crate::account::{VirtualDurableNonce, VirtualRelayAccount, VirtualTimelockAccount};
use crate::config::MIXED_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MemoryLayout {
    #[default]
    Mixed = 0,
    Timelock = 1,
    Nonce = 2,
    Relay = 3,
}

impl MemoryLayout {
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Payload bytes per page.
    pub fn page_size(self) -> usize {
        match self {
            Self::Mixed => MIXED_PAGE_SIZE,
            Self::Timelock => 1 + VirtualTimelockAccount::LEN,
            Self::Nonce => 1 + VirtualDurableNonce::LEN,
            Self::Relay => 1 + VirtualRelayAccount::LEN,
        }
    }
}

impl TryFrom<u8> for MemoryLayout {
    type Error = MemoryError;

    fn try_from(tag: u8) -> Result<Self, MemoryError> {
        match tag {
            0 => Ok(Self::Mixed),
            1 => Ok(Self::Timelock),
            2 => Ok(Self::Nonce),
            3 => Ok(Self::Relay),
            other => Err(MemoryError::UnknownLayout(other)),
        }
    }
}

impl FromStr for MemoryLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mixed" => Ok(Self::Mixed),
            "timelock" => Ok(Self::Timelock),
            "nonce" => Ok(Self::Nonce),
            "relay" => Ok(Self::Relay),
            other => Err(format!(
                "unknown layout '{other}', expected mixed, timelock, nonce or relay"
            )),
        }
    }
}

impl fmt::Display for MemoryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed => write!(f, "mixed"),
            Self::Timelock => write!(f, "timelock"),
            Self::Nonce => write!(f, "nonce"),
            Self::Relay => write!(f, "relay"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_sizes() {
        assert_eq!(MemoryLayout::Mixed.page_size(), 32);
        assert_eq!(MemoryLayout::Timelock.page_size(), 77);
        assert_eq!(MemoryLayout::Nonce.page_size(), 65);
        assert_eq!(MemoryLayout::Relay.page_size(), 129);
    }

    #[test]
    fn test_tag_roundtrip() {
        for layout in [
            MemoryLayout::Mixed,
            MemoryLayout::Timelock,
            MemoryLayout::Nonce,
            MemoryLayout::Relay,
        ] {
            assert_eq!(MemoryLayout::try_from(layout.tag()), Ok(layout));
            assert_eq!(layout.to_string().parse::<MemoryLayout>(), Ok(layout));
        }
        assert_eq!(MemoryLayout::try_from(4), Err(MemoryError::UnknownLayout(4)));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&MemoryLayout::Timelock).unwrap();
        assert_eq!(json, "\"timelock\"");
    }
}
