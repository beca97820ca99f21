//! The 74-byte header in front of a memory account's slab.
//!
//! ```text
//! discriminator:8 ‖ vm:32 ‖ bump:1 ‖ name:32 ‖ layout:1
//! ```

use serde::{Deserialize, Serialize};

use super::error::{MemoryError, MemoryResult};
use super::layout::MemoryLayout;
use crate::config::{MAX_NAME_LEN, MEMORY_HEADER_LEN};
use crate::crypto::Pubkey;

/// Wire form; bincode lays it out field by field with no padding.
#[derive(Serialize, Deserialize)]
struct RawHeader {
    discriminator: [u8; 8],
    vm: Pubkey,
    bump: u8,
    name: [u8; MAX_NAME_LEN],
    layout: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAccountHeader {
    pub discriminator: [u8; 8],
    /// The VM this memory belongs to.
    pub vm: Pubkey,
    pub bump: u8,
    /// NUL-padded account name.
    pub name: [u8; MAX_NAME_LEN],
    pub layout: MemoryLayout,
}

impl MemoryAccountHeader {
    pub const LEN: usize = MEMORY_HEADER_LEN;

    /// Parse the header off the front of raw account data.
    pub fn parse(data: &[u8]) -> MemoryResult<Self> {
        if data.len() < Self::LEN {
            return Err(MemoryError::Malformed(format!(
                "memory account header needs {} bytes, got {}",
                Self::LEN,
                data.len()
            )));
        }
        let raw: RawHeader = bincode::deserialize(&data[..Self::LEN])
            .map_err(|e| MemoryError::Malformed(e.to_string()))?;

        Ok(Self {
            discriminator: raw.discriminator,
            vm: raw.vm,
            bump: raw.bump,
            name: raw.name,
            layout: MemoryLayout::try_from(raw.layout)?,
        })
    }

    pub fn to_bytes(&self) -> MemoryResult<Vec<u8>> {
        let raw = RawHeader {
            discriminator: self.discriminator,
            vm: self.vm,
            bump: self.bump,
            name: self.name,
            layout: self.layout.tag(),
        };
        bincode::serialize(&raw).map_err(|e| MemoryError::Malformed(e.to_string()))
    }

    /// The name with its NUL padding stripped.
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Build a NUL-padded name field. Longer names are cut at 32 bytes.
    pub fn name_field(name: &str) -> [u8; MAX_NAME_LEN] {
        let mut field = [0u8; MAX_NAME_LEN];
        let len = name.len().min(MAX_NAME_LEN);
        field[..len].copy_from_slice(&name.as_bytes()[..len]);
        field
    }
}
