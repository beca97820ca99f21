//! Memory geometry.
//!
//! The program fixes slot and sector counts at compile time; the mirror
//! takes them at runtime so one binary can read any deployment. Two presets
//! cover what actually exists.

use serde::{Deserialize, Serialize};

use super::account_index::AccountIndex;
use super::error::{MemoryError, MemoryResult};
use super::layout::MemoryLayout;
use super::sector::Sector;
use crate::config::{
    PRODUCTION_MAX_ACCOUNTS, PRODUCTION_NUM_SECTORS, TEST_MAX_ACCOUNTS, TEST_NUM_SECTORS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Slots in the account index table. At most 65,535 (`u16` indices).
    pub max_accounts: usize,
    /// Sectors in the slab. At most 255 (`u8` references).
    pub num_sectors: usize,
    #[serde(default)]
    pub layout: MemoryLayout,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::test()
    }
}

impl MemoryConfig {
    /// What the program deploys today: 100 slots, 2 sectors.
    pub fn test() -> Self {
        Self {
            max_accounts: TEST_MAX_ACCOUNTS,
            num_sectors: TEST_NUM_SECTORS,
            layout: MemoryLayout::Mixed,
        }
    }

    /// Full capacity: 65,535 slots, 255 sectors.
    pub fn production() -> Self {
        Self {
            max_accounts: PRODUCTION_MAX_ACCOUNTS,
            num_sectors: PRODUCTION_NUM_SECTORS,
            layout: MemoryLayout::Mixed,
        }
    }

    pub fn with_layout(self, layout: MemoryLayout) -> Self {
        Self { layout, ..self }
    }

    pub fn validate(&self) -> MemoryResult<()> {
        if self.max_accounts == 0 || self.max_accounts > u16::MAX as usize {
            return Err(MemoryError::InvalidConfig(format!(
                "max_accounts must be 1..=65535, got {}",
                self.max_accounts
            )));
        }
        if self.num_sectors == 0 || self.num_sectors > u8::MAX as usize {
            return Err(MemoryError::InvalidConfig(format!(
                "num_sectors must be 1..=255, got {}",
                self.num_sectors
            )));
        }
        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.layout.page_size()
    }

    /// Byte length of the slab: index table then sectors.
    pub fn slab_len(&self) -> usize {
        self.max_accounts * AccountIndex::LEN + self.num_sectors * Sector::encoded_len(self.page_size())
    }
}
