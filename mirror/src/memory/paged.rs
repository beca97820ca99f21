//! # Paged Memory
//!
//! The slab behind a memory account: an index table of [`AccountIndex`]
//! entries followed by sectors of linked pages.
//!
//! ```text
//! accounts: [AccountIndex; max_accounts]   size:2 page:1 sector:1
//! sectors:  [Sector; num_sectors]          num_allocated:1 pages:[Page; 255]
//! ```
//!
//! ## Placement
//!
//! A record goes into the *first* sector whose free-page count is strictly
//! greater than the pages it needs, on the lowest free pages of that
//! sector, linked in ascending order. That is the program's rule, strict
//! inequality included. It means a sector never fills its last free page,
//! so the largest record a sector can take is 254 pages. Don't "fix" the
//! off-by-one: the program would then place records differently and the
//! dumps would stop matching.

use tracing::debug;

use super::account_index::AccountIndex;
use super::allocator::MemoryAllocator;
use super::config::MemoryConfig;
use super::error::{MemoryError, MemoryResult};
use super::header::MemoryAccountHeader;
use super::page::Page;
use super::sector::Sector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedMemory {
    config: MemoryConfig,
    accounts: Vec<AccountIndex>,
    sectors: Vec<Sector>,
}

impl PagedMemory {
    /// Empty memory with the given geometry.
    pub fn new(config: MemoryConfig) -> MemoryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            accounts: vec![AccountIndex::default(); config.max_accounts],
            sectors: vec![Sector::new(config.page_size()); config.num_sectors],
        })
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size()
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn account_index(&self, index: u16) -> Option<&AccountIndex> {
        self.accounts.get(index as usize)
    }

    /// Indices of every allocated slot, ascending.
    pub fn allocated_slots(&self) -> impl Iterator<Item = u16> + '_ {
        self.accounts
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_allocated())
            .map(|(i, _)| i as u16)
    }

    fn find_sector_for(&self, num_pages: usize) -> Option<usize> {
        self.sectors
            .iter()
            .position(|sector| num_pages < sector.num_empty())
    }

    fn allocated_entry(&self, index: u16) -> MemoryResult<AccountIndex> {
        self.check_index(index)?;
        let entry = self.accounts[index as usize];
        if entry.is_empty() {
            return Err(MemoryError::SlotEmpty(index));
        }
        Ok(entry)
    }

    fn sector_of(&self, entry: &AccountIndex) -> MemoryResult<&Sector> {
        self.sectors.get(entry.sector as usize).ok_or_else(|| {
            MemoryError::Malformed(format!("sector {} out of range", entry.sector))
        })
    }

    // -- Wire format -------------------------------------------------------

    /// Parse a raw slab (no header) laid out for `config`.
    pub fn from_bytes(config: MemoryConfig, data: &[u8]) -> MemoryResult<Self> {
        config.validate()?;
        if data.len() < config.slab_len() {
            return Err(MemoryError::Malformed(format!(
                "slab needs {} bytes, got {}",
                config.slab_len(),
                data.len()
            )));
        }

        let (table, rest) = data.split_at(config.max_accounts * AccountIndex::LEN);
        let accounts: Vec<AccountIndex> = table
            .chunks_exact(AccountIndex::LEN)
            .map(|chunk| AccountIndex::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let sector_len = Sector::encoded_len(config.page_size());
        let sectors = rest
            .chunks_exact(sector_len)
            .take(config.num_sectors)
            .map(|chunk| Sector::read_from(chunk, config.page_size()))
            .collect::<MemoryResult<Vec<_>>>()?;

        for (i, entry) in accounts.iter().enumerate() {
            if entry.is_allocated() && entry.sector as usize >= config.num_sectors {
                return Err(MemoryError::Malformed(format!(
                    "slot {i} points at sector {} of {}",
                    entry.sector, config.num_sectors
                )));
            }
        }

        Ok(Self {
            config,
            accounts,
            sectors,
        })
    }

    /// Parse a whole memory account: header, then slab. The page size comes
    /// from the header's layout byte; `config` supplies the slot and sector
    /// counts.
    pub fn from_account_data(
        config: MemoryConfig,
        data: &[u8],
    ) -> MemoryResult<(MemoryAccountHeader, Self)> {
        let header = MemoryAccountHeader::parse(data)?;
        let config = config.with_layout(header.layout);
        let memory = Self::from_bytes(config, &data[MemoryAccountHeader::LEN..])?;
        Ok((header, memory))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.config.slab_len());
        for entry in &self.accounts {
            out.extend_from_slice(&entry.to_bytes());
        }
        for sector in &self.sectors {
            sector.write_to(&mut out);
        }
        out
    }
}

impl MemoryAllocator for PagedMemory {
    fn capacity(&self) -> usize {
        self.accounts.len()
    }

    fn is_empty(&self, index: u16) -> bool {
        self.accounts
            .get(index as usize)
            .map_or(true, AccountIndex::is_empty)
    }

    fn has_room_for(&self, size: usize) -> bool {
        let pages = Page::calc_num_pages_needed(size, self.page_size());
        self.find_sector_for(pages).is_some()
    }

    /// Follow the chain and return exactly `size` bytes.
    fn read(&self, index: u16) -> MemoryResult<Vec<u8>> {
        let entry = self.allocated_entry(index)?;
        let mut data = self.sector_of(&entry)?.read_chain(entry.page)?;

        if data.len() < entry.size as usize {
            return Err(MemoryError::Malformed(format!(
                "slot {index} declares {} bytes, chain holds {}",
                entry.size,
                data.len()
            )));
        }
        data.truncate(entry.size as usize);
        Ok(data)
    }

    fn alloc(&mut self, index: u16, size: usize) -> MemoryResult<()> {
        self.check_index(index)?;
        if self.has_item(index) {
            return Err(MemoryError::SlotOccupied(index));
        }
        if size == 0 {
            return Err(MemoryError::EmptyData);
        }
        let declared = u16::try_from(size).map_err(|_| MemoryError::OutOfSpace { size })?;

        let pages = Page::calc_num_pages_needed(size, self.page_size());
        let sector_index = self
            .find_sector_for(pages)
            .ok_or(MemoryError::OutOfSpace { size })?;
        let page_size = self.page_size();
        let page = self.sectors[sector_index].try_alloc_pages(size, page_size)?;

        self.accounts[index as usize] = AccountIndex {
            size: declared,
            page,
            sector: sector_index as u8,
        };

        debug!(index, size, sector = sector_index, page, pages, "memory slot allocated");
        Ok(())
    }

    /// Zero the chain and clear the slot. Freeing an empty slot is an error.
    fn free(&mut self, index: u16) -> MemoryResult<()> {
        let entry = self.allocated_entry(index)?;
        self.sector_of(&entry)?;
        self.sectors[entry.sector as usize].free_pages(entry.page)?;
        self.accounts[index as usize].clear();

        debug!(index, sector = entry.sector, page = entry.page, "memory slot freed");
        Ok(())
    }

    fn overwrite(&mut self, index: u16, data: &[u8]) -> MemoryResult<()> {
        let entry = self.allocated_entry(index)?;
        if data.len() > entry.size as usize {
            return Err(MemoryError::InsufficientSize {
                index,
                allocated: entry.size as usize,
                requested: data.len(),
            });
        }
        self.sector_of(&entry)?;

        let page_size = self.page_size();
        self.sectors[entry.sector as usize].write_chain(entry.page, data, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NUM_PAGES;
    use crate::memory::MemoryLayout;

    fn memory() -> PagedMemory {
        PagedMemory::new(MemoryConfig::test()).unwrap()
    }

    fn bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8 + 1).collect()
    }

    #[test]
    fn test_small_item() {
        let mut mem = memory();
        mem.write(0, &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(mem.read(0).unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(mem.has_item(0));
    }

    #[test]
    fn test_round_trip_across_page_counts() {
        let mut mem = memory();
        let page = mem.page_size();
        for (slot, pages) in [1usize, 2, 3, 8, 40].into_iter().enumerate() {
            let data = bytes(page * pages - 1);
            mem.write(slot as u16, &data).unwrap();
            assert_eq!(mem.read(slot as u16).unwrap(), data);
        }
    }

    #[test]
    fn test_scattered_slots() {
        let mut mem = memory();
        let a = [42u8; 42];
        let b = [69u8; 69];
        let c = [137u8; 137];

        mem.write(92, &a).unwrap();
        mem.write(80, &b).unwrap();
        mem.write(28, &c).unwrap();

        assert_eq!(mem.read(92).unwrap(), a);
        assert_eq!(mem.read(80).unwrap(), b);
        assert_eq!(mem.read(28).unwrap(), c);
        assert_eq!(mem.allocated_slots().collect::<Vec<_>>(), vec![28, 80, 92]);
    }

    #[test]
    fn test_free_and_reuse() {
        let mut mem = memory();
        mem.write(0, &[42; 42]).unwrap();
        mem.write(1, &[69; 69]).unwrap();
        mem.write(2, &[137; 137]).unwrap();

        mem.free(1).unwrap();
        assert!(mem.is_empty(1));
        assert_eq!(mem.read(1), Err(MemoryError::SlotEmpty(1)));

        let d = [255u8; 255];
        mem.write(1, &d).unwrap();
        assert_eq!(mem.read(0).unwrap(), [42; 42]);
        assert_eq!(mem.read(1).unwrap(), d);
        assert_eq!(mem.read(2).unwrap(), [137; 137]);
    }

    #[test]
    fn test_free_zeroes_pages() {
        let mut mem = memory();
        mem.write(3, &[7; 70]).unwrap();
        let entry = *mem.account_index(3).unwrap();
        let chain = mem.sectors()[entry.sector as usize].linked_pages(entry.page).unwrap();

        mem.free(3).unwrap();
        let sector = &mem.sectors()[entry.sector as usize];
        assert_eq!(sector.num_allocated(), 0);
        for page in chain {
            let page = sector.page(page).unwrap();
            assert!(page.is_empty());
            assert!(page.data().iter().all(|&b| b == 0));
        }
        assert_eq!(*mem.account_index(3).unwrap(), AccountIndex::default());
    }

    #[test]
    fn test_slot_errors() {
        let mut mem = memory();
        assert_eq!(mem.read(5), Err(MemoryError::SlotEmpty(5)));
        assert_eq!(mem.free(5), Err(MemoryError::SlotEmpty(5)));
        assert_eq!(mem.write(5, &[]), Err(MemoryError::EmptyData));
        assert_eq!(
            mem.read(100),
            Err(MemoryError::IndexOutOfRange {
                index: 100,
                capacity: 100
            })
        );

        mem.write(5, &[1]).unwrap();
        assert_eq!(mem.write(5, &[2]), Err(MemoryError::SlotOccupied(5)));
        assert_eq!(mem.read(5).unwrap(), vec![1]);
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut mem = memory();
        mem.alloc(4, 40).unwrap();
        mem.overwrite(4, &[9; 40]).unwrap();
        mem.overwrite(4, &[1; 10]).unwrap();

        let data = mem.read(4).unwrap();
        assert_eq!(&data[..10], &[1; 10]);
        assert_eq!(&data[10..], &[9; 30]);

        assert_eq!(
            mem.overwrite(4, &[0; 41]),
            Err(MemoryError::InsufficientSize {
                index: 4,
                allocated: 40,
                requested: 41
            })
        );
    }

    #[test]
    fn test_largest_record_is_one_page_short_of_a_sector() {
        let mut mem = memory();
        let page = mem.page_size();

        let too_big = bytes(page * (NUM_PAGES - 1) + 1);
        assert!(!mem.has_room_for(too_big.len()));
        assert_eq!(
            mem.write(0, &too_big),
            Err(MemoryError::OutOfSpace {
                size: too_big.len()
            })
        );
        assert!(mem.is_empty(0));

        let largest = bytes(page * (NUM_PAGES - 1));
        mem.write(0, &largest).unwrap();
        assert_eq!(mem.read(0).unwrap(), largest);
        assert_eq!(mem.sectors()[0].num_empty(), 1);
    }

    #[test]
    fn test_spills_into_next_sector() {
        let mut mem = memory();
        let page = mem.page_size();
        mem.write(0, &bytes(page * 200)).unwrap();
        mem.write(1, &bytes(page * 60)).unwrap();

        assert_eq!(mem.account_index(0).unwrap().sector, 0);
        assert_eq!(mem.account_index(1).unwrap().sector, 1);
        assert_eq!(mem.account_index(1).unwrap().page, 0);
    }

    #[test]
    fn test_out_of_space_leaves_memory_untouched() {
        let mut mem = memory();
        let page = mem.page_size();
        mem.write(0, &bytes(page * 254)).unwrap();
        mem.write(1, &bytes(page * 254)).unwrap();
        let before = mem.clone();

        assert!(matches!(
            mem.write(2, &bytes(page)),
            Err(MemoryError::OutOfSpace { .. })
        ));
        assert_eq!(mem, before);
    }

    #[test]
    fn test_wire_roundtrip() {
        let mut mem = memory();
        mem.write(0, &[1; 33]).unwrap();
        mem.write(7, &[2; 100]).unwrap();

        let raw = mem.to_bytes();
        assert_eq!(raw.len(), MemoryConfig::test().slab_len());
        assert_eq!(&raw[..4], &[33, 0, 0, 0]);

        let parsed = PagedMemory::from_bytes(MemoryConfig::test(), &raw).unwrap();
        assert_eq!(parsed, mem);
        assert_eq!(parsed.read(7).unwrap(), vec![2; 100]);
    }

    #[test]
    fn test_from_bytes_rejects_short_and_bad_sector() {
        let mem = memory();
        let raw = mem.to_bytes();
        assert!(matches!(
            PagedMemory::from_bytes(MemoryConfig::test(), &raw[..raw.len() - 1]),
            Err(MemoryError::Malformed(_))
        ));

        let mut raw = raw;
        raw[0] = 1;
        raw[3] = 9;
        assert!(matches!(
            PagedMemory::from_bytes(MemoryConfig::test(), &raw),
            Err(MemoryError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_account_data_uses_header_layout() {
        let config = MemoryConfig::test().with_layout(MemoryLayout::Nonce);
        let mut mem = PagedMemory::new(config).unwrap();
        mem.write(2, &[5; 65]).unwrap();

        let header = MemoryAccountHeader {
            discriminator: [0; 8],
            vm: Default::default(),
            bump: 1,
            name: MemoryAccountHeader::name_field("nonces"),
            layout: MemoryLayout::Nonce,
        };
        let mut data = header.to_bytes().unwrap();
        data.extend_from_slice(&mem.to_bytes());

        let (parsed_header, parsed) =
            PagedMemory::from_account_data(MemoryConfig::test(), &data).unwrap();
        assert_eq!(parsed_header, header);
        assert_eq!(parsed.page_size(), 65);
        assert_eq!(parsed.read(2).unwrap(), vec![5; 65]);
    }
}
