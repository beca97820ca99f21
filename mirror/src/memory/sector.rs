//! Sectors: 255 pages plus an allocated-page counter.
//!
//! Chains never cross a sector boundary, so a record's pages are always
//! found by following `next_page` inside the one sector its index entry
//! names.

use tracing::trace;

use super::error::{MemoryError, MemoryResult};
use super::page::{Page, PageReference};
use crate::config::NUM_PAGES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
    num_allocated: u8,
    pages: Vec<Page>,
}

impl Sector {
    pub fn new(page_size: usize) -> Self {
        Self {
            num_allocated: 0,
            pages: vec![Page::new(page_size); NUM_PAGES],
        }
    }

    /// Wire size: `num_allocated:1 ‖ pages:[Page; 255]`.
    pub fn encoded_len(page_size: usize) -> usize {
        1 + NUM_PAGES * Page::encoded_len(page_size)
    }

    pub fn num_allocated(&self) -> u8 {
        self.num_allocated
    }

    pub fn num_empty(&self) -> usize {
        NUM_PAGES - self.num_allocated as usize
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: u8) -> Option<&Page> {
        self.pages.get(index as usize)
    }

    /// The first `num_required` free pages, lowest index first.
    fn find_empty(&self, num_required: usize) -> Option<Vec<u8>> {
        let empty: Vec<u8> = self
            .pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_empty())
            .map(|(i, _)| i as u8)
            .take(num_required)
            .collect();

        (empty.len() == num_required).then_some(empty)
    }

    /// Page indices of the chain starting at `start`, in link order.
    ///
    /// A chain longer than the sector can only mean a cycle, which a dump
    /// read off the wire could in principle contain.
    pub fn linked_pages(&self, start: u8) -> MemoryResult<Vec<u8>> {
        let mut linked = Vec::new();
        let mut current = start;

        loop {
            let page = self.page(current).ok_or_else(|| {
                MemoryError::Malformed(format!("page index {current} out of range"))
            })?;
            linked.push(current);
            trace!(page = current, next = ?page.next(), "walk page chain");

            match page.next() {
                Some(next) => current = next,
                None => break,
            }
            if linked.len() >= NUM_PAGES {
                return Err(MemoryError::Malformed(format!(
                    "page chain from {start} does not terminate"
                )));
            }
        }

        Ok(linked)
    }

    /// Allocate and link enough pages for `data_size` bytes. Returns the
    /// index of the first page.
    ///
    /// Free pages are taken lowest index first and linked in that order.
    /// The program does exactly this, and dumps only match if we do too.
    pub fn try_alloc_pages(&mut self, data_size: usize, page_size: usize) -> MemoryResult<u8> {
        let num_required = Page::calc_num_pages_needed(data_size, page_size);
        if num_required == 0 {
            return Err(MemoryError::EmptyData);
        }

        let empty = self
            .find_empty(num_required)
            .ok_or(MemoryError::OutOfSpace { size: data_size })?;

        for (i, &index) in empty.iter().enumerate() {
            let next = match empty.get(i + 1) {
                Some(&following) => PageReference::Index(following),
                None => PageReference::None,
            };
            let page = &mut self.pages[index as usize];
            page.allocate();
            page.set_next_ref(next);
        }

        self.update_state();
        Ok(empty[0])
    }

    /// Free the whole chain starting at `start`.
    pub fn free_pages(&mut self, start: u8) -> MemoryResult<()> {
        for index in self.linked_pages(start)? {
            self.pages[index as usize].free();
        }
        self.update_state();
        Ok(())
    }

    /// Copy `data` into the chain at `start`, one chunk per page.
    pub(crate) fn write_chain(&mut self, start: u8, data: &[u8], page_size: usize) -> MemoryResult<()> {
        let chain = self.linked_pages(start)?;
        if data.chunks(page_size).count() > chain.len() {
            return Err(MemoryError::Malformed(format!(
                "chain from {start} has {} pages, data needs more",
                chain.len()
            )));
        }

        for (chunk, index) in data.chunks(page_size).zip(chain) {
            self.pages[index as usize].data_mut()[..chunk.len()].copy_from_slice(chunk);
        }
        Ok(())
    }

    /// Concatenated data of the chain at `start`.
    pub(crate) fn read_chain(&self, start: u8) -> MemoryResult<Vec<u8>> {
        let mut data = Vec::new();
        for index in self.linked_pages(start)? {
            data.extend_from_slice(self.pages[index as usize].data());
        }
        Ok(data)
    }

    fn update_state(&mut self) {
        self.num_allocated = self.pages.iter().filter(|page| page.is_allocated()).count() as u8;
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.num_allocated);
        for page in &self.pages {
            page.write_to(out);
        }
    }

    pub fn read_from(bytes: &[u8], page_size: usize) -> MemoryResult<Self> {
        if bytes.len() != Self::encoded_len(page_size) {
            return Err(MemoryError::Malformed(format!(
                "sector needs {} bytes, got {}",
                Self::encoded_len(page_size),
                bytes.len()
            )));
        }

        let pages = bytes[1..]
            .chunks_exact(Page::encoded_len(page_size))
            .map(|chunk| Page::read_from(chunk, page_size))
            .collect::<MemoryResult<Vec<_>>>()?;

        Ok(Self {
            num_allocated: bytes[0],
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: usize = 32;

    #[test]
    fn test_single_page_allocations() {
        let mut sector = Sector::new(PAGE);
        assert_eq!(sector.num_empty(), 255);

        let first = sector.try_alloc_pages(32, PAGE).unwrap();
        let second = sector.try_alloc_pages(1, PAGE).unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(sector.num_allocated(), 2);
        assert_eq!(sector.linked_pages(first).unwrap(), vec![0]);

        sector.free_pages(first).unwrap();
        assert_eq!(sector.num_allocated(), 1);
        assert_eq!(sector.num_empty(), 254);
    }

    #[test]
    fn test_chain_links_ascending_free_pages() {
        let mut sector = Sector::new(PAGE);
        let a = sector.try_alloc_pages(PAGE, PAGE).unwrap();
        let b = sector.try_alloc_pages(PAGE, PAGE).unwrap();
        let c = sector.try_alloc_pages(PAGE, PAGE).unwrap();
        sector.free_pages(b).unwrap();
        assert_eq!((a, c), (0, 2));

        // Three pages: the hole at 1, then 3 and 4.
        let head = sector.try_alloc_pages(PAGE * 3, PAGE).unwrap();
        assert_eq!(head, 1);
        assert_eq!(sector.linked_pages(head).unwrap(), vec![1, 3, 4]);
        assert_eq!(sector.num_allocated(), 5);
    }

    #[test]
    fn test_write_and_read_chain() {
        let mut sector = Sector::new(4);
        let head = sector.try_alloc_pages(10, 4).unwrap();
        sector.write_chain(head, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 4).unwrap();

        let data = sector.read_chain(head).unwrap();
        assert_eq!(data.len(), 12);
        assert_eq!(&data[..10], &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_not_enough_pages() {
        let mut sector = Sector::new(PAGE);
        assert_eq!(
            sector.try_alloc_pages(PAGE * 256, PAGE),
            Err(MemoryError::OutOfSpace { size: PAGE * 256 })
        );
        assert_eq!(sector.num_allocated(), 0);
    }

    #[test]
    fn test_cycle_is_malformed() {
        let mut sector = Sector::new(PAGE);
        let head = sector.try_alloc_pages(PAGE * 2, PAGE).unwrap();
        let mut bytes = Vec::new();
        sector.write_to(&mut bytes);

        // Point page 1 back at itself.
        let next_of_page_1 = 1 + 2 * Page::encoded_len(PAGE) - 1;
        bytes[next_of_page_1] = 1;
        let looped = Sector::read_from(&bytes, PAGE).unwrap();
        assert!(matches!(
            looped.linked_pages(head),
            Err(MemoryError::Malformed(_))
        ));
    }

    #[test]
    fn test_wire_roundtrip() {
        let mut sector = Sector::new(8);
        let head = sector.try_alloc_pages(20, 8).unwrap();
        sector.write_chain(head, &[0xab; 20], 8).unwrap();

        let mut bytes = Vec::new();
        sector.write_to(&mut bytes);
        assert_eq!(bytes.len(), Sector::encoded_len(8));
        assert_eq!(Sector::read_from(&bytes, 8), Ok(sector));
    }
}
