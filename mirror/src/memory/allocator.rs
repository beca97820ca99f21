//! The allocator seam.
//!
//! Memory accounts come in two flavours on-chain, paged and fixed-slot.
//! Both answer the same questions, so the compression bridge talks to this
//! trait and doesn't care which one it's holding.

use super::error::{MemoryError, MemoryResult};
use crate::account::VirtualAccount;

pub trait MemoryAllocator {
    /// Number of addressable slots.
    fn capacity(&self) -> usize;

    /// `true` for unallocated slots and for slots past the end.
    fn is_empty(&self, index: u16) -> bool;

    fn has_item(&self, index: u16) -> bool {
        !self.is_empty(index)
    }

    /// Whether a record of `size` bytes would fit somewhere right now.
    fn has_room_for(&self, size: usize) -> bool;

    /// The bytes stored at `index`.
    fn read(&self, index: u16) -> MemoryResult<Vec<u8>>;

    /// Reserve room for `size` bytes at an empty slot without writing them.
    fn alloc(&mut self, index: u16, size: usize) -> MemoryResult<()>;

    /// Release an allocated slot.
    fn free(&mut self, index: u16) -> MemoryResult<()>;

    /// Write into a slot that is already allocated and big enough.
    fn overwrite(&mut self, index: u16, data: &[u8]) -> MemoryResult<()>;

    fn check_index(&self, index: u16) -> MemoryResult<()> {
        if index as usize >= self.capacity() {
            return Err(MemoryError::IndexOutOfRange {
                index,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Allocate and fill an empty slot in one go.
    ///
    /// Every precondition is checked up front, so either the record lands
    /// or nothing changes.
    fn write(&mut self, index: u16, data: &[u8]) -> MemoryResult<()> {
        if data.is_empty() {
            return Err(MemoryError::EmptyData);
        }
        self.check_index(index)?;
        if self.has_item(index) {
            return Err(MemoryError::SlotOccupied(index));
        }
        if !self.has_room_for(data.len()) {
            return Err(MemoryError::OutOfSpace { size: data.len() });
        }

        self.alloc(index, data.len())?;
        self.overwrite(index, data)
    }

    fn read_account(&self, index: u16) -> MemoryResult<VirtualAccount> {
        let bytes = self.read(index)?;
        Ok(VirtualAccount::unpack(&bytes)?)
    }

    fn write_account(&mut self, index: u16, account: &VirtualAccount) -> MemoryResult<()> {
        let bytes = account.pack()?;
        self.write(index, &bytes)
    }
}
