//! Fixed-slot memory.
//!
//! Every slot is the same size and there's no chaining. Reads hand back the
//! whole slot, padding included; the account codec ignores trailing bytes,
//! so that's fine for anything stored through `write_account`.

use tracing::debug;

use super::allocator::MemoryAllocator;
use super::error::{MemoryError, MemoryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemState {
    Empty,
    Allocated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleMemory {
    slot_size: usize,
    state: Vec<ItemState>,
    data: Vec<Vec<u8>>,
}

impl SimpleMemory {
    pub fn new(capacity: u16, slot_size: usize) -> Self {
        Self {
            slot_size,
            state: vec![ItemState::Empty; capacity as usize],
            data: vec![vec![0; slot_size]; capacity as usize],
        }
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    fn check_size(&self, index: u16, requested: usize) -> MemoryResult<()> {
        if requested > self.slot_size {
            return Err(MemoryError::InsufficientSize {
                index,
                allocated: self.slot_size,
                requested,
            });
        }
        Ok(())
    }
}

impl MemoryAllocator for SimpleMemory {
    fn capacity(&self) -> usize {
        self.state.len()
    }

    fn is_empty(&self, index: u16) -> bool {
        self.state
            .get(index as usize)
            .map_or(true, |state| *state == ItemState::Empty)
    }

    fn has_room_for(&self, size: usize) -> bool {
        size <= self.slot_size && self.state.contains(&ItemState::Empty)
    }

    fn read(&self, index: u16) -> MemoryResult<Vec<u8>> {
        self.check_index(index)?;
        if self.is_empty(index) {
            return Err(MemoryError::SlotEmpty(index));
        }
        Ok(self.data[index as usize].clone())
    }

    fn alloc(&mut self, index: u16, size: usize) -> MemoryResult<()> {
        self.check_index(index)?;
        if self.has_item(index) {
            return Err(MemoryError::SlotOccupied(index));
        }
        self.check_size(index, size)?;

        self.state[index as usize] = ItemState::Allocated;
        self.data[index as usize].fill(0);
        debug!(index, size, "simple slot allocated");
        Ok(())
    }

    fn free(&mut self, index: u16) -> MemoryResult<()> {
        self.check_index(index)?;
        if self.is_empty(index) {
            return Err(MemoryError::SlotEmpty(index));
        }

        self.state[index as usize] = ItemState::Empty;
        self.data[index as usize].fill(0);
        debug!(index, "simple slot freed");
        Ok(())
    }

    fn overwrite(&mut self, index: u16, data: &[u8]) -> MemoryResult<()> {
        self.check_index(index)?;
        if self.is_empty(index) {
            return Err(MemoryError::SlotEmpty(index));
        }
        self.check_size(index, data.len())?;

        self.data[index as usize][..data.len()].copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{VirtualAccount, VirtualDurableNonce};
    use crate::crypto::{Hash, Pubkey};

    #[test]
    fn test_small_item() {
        let mut mem = SimpleMemory::new(10, 32);
        mem.write(0, &[1, 2, 3, 4, 5]).unwrap();

        let data = mem.read(0).unwrap();
        assert_eq!(data.len(), 32);
        assert_eq!(&data[..5], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_bounds() {
        let mut mem = SimpleMemory::new(10, 32);
        assert!(matches!(
            mem.alloc(10, 1),
            Err(MemoryError::IndexOutOfRange { index: 10, .. })
        ));
        assert!(matches!(
            mem.alloc(0, 33),
            Err(MemoryError::InsufficientSize { .. })
        ));
        assert_eq!(mem.overwrite(0, &[1]), Err(MemoryError::SlotEmpty(0)));
    }

    #[test]
    fn test_free_and_realloc() {
        let mut mem = SimpleMemory::new(4, 16);
        mem.write(2, &[10, 20, 30]).unwrap();
        mem.free(2).unwrap();
        assert!(mem.is_empty(2));
        assert_eq!(mem.read(2), Err(MemoryError::SlotEmpty(2)));

        mem.write(2, &[5, 15, 25, 35]).unwrap();
        assert_eq!(&mem.read(2).unwrap()[..4], &[5, 15, 25, 35]);
        assert_eq!(&mem.read(2).unwrap()[4..], &[0; 12]);
    }

    #[test]
    fn test_full_memory_has_no_room() {
        let mut mem = SimpleMemory::new(2, 8);
        mem.write(0, &[1]).unwrap();
        mem.write(1, &[1]).unwrap();
        assert!(!mem.has_room_for(1));
    }

    #[test]
    fn test_accounts_survive_padding() {
        let account = VirtualAccount::Nonce(VirtualDurableNonce {
            address: Pubkey::new_from_array([3; 32]),
            nonce: Hash::new_from_array([4; 32]),
        });
        let mut mem = SimpleMemory::new(4, VirtualAccount::MAX_SIZE);
        mem.write_account(1, &account).unwrap();
        assert_eq!(mem.read_account(1), Ok(account));
    }
}
