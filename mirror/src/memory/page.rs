//! Pages: the unit of allocation inside a sector.

use super::error::{MemoryError, MemoryResult};

/// Where a page's chain continues. Index 0 is the end-of-chain marker, which
/// is why page 0 can only ever head a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageReference {
    None,
    Index(u8),
}

impl PageReference {
    pub fn pack(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Index(i) => i,
        }
    }

    pub fn unpack(value: u8) -> Self {
        match value {
            0 => Self::None,
            i => Self::Index(i),
        }
    }
}

/// One fixed-size page. On the wire: `is_allocated:1 ‖ data:page_size ‖
/// next_page:1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    is_allocated: u8,
    data: Vec<u8>,
    next_page: u8,
}

impl Page {
    pub fn new(page_size: usize) -> Self {
        Self {
            is_allocated: 0,
            data: vec![0; page_size],
            next_page: 0,
        }
    }

    /// Wire size of a page with `page_size` data bytes.
    pub fn encoded_len(page_size: usize) -> usize {
        1 + page_size + 1
    }

    pub fn calc_num_pages_needed(data_size: usize, page_size: usize) -> usize {
        data_size.div_ceil(page_size)
    }

    pub fn is_allocated(&self) -> bool {
        self.is_allocated == 1
    }

    pub fn is_empty(&self) -> bool {
        self.is_allocated == 0
    }

    pub fn allocate(&mut self) {
        self.is_allocated = 1;
    }

    /// Release the page and wipe it: data zeroed, link cleared.
    pub fn free(&mut self) {
        self.is_allocated = 0;
        self.data.fill(0);
        self.next_page = 0;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn next(&self) -> Option<u8> {
        match self.next_ref() {
            PageReference::None => None,
            PageReference::Index(i) => Some(i),
        }
    }

    pub fn next_ref(&self) -> PageReference {
        PageReference::unpack(self.next_page)
    }

    pub fn set_next_ref(&mut self, next: PageReference) {
        self.next_page = next.pack();
    }

    pub fn has_next(&self) -> bool {
        self.next_ref() != PageReference::None
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.is_allocated);
        out.extend_from_slice(&self.data);
        out.push(self.next_page);
    }

    /// Parse one page from exactly [`Page::encoded_len`] bytes.
    pub fn read_from(bytes: &[u8], page_size: usize) -> MemoryResult<Self> {
        if bytes.len() != Self::encoded_len(page_size) {
            return Err(MemoryError::Malformed(format!(
                "page needs {} bytes, got {}",
                Self::encoded_len(page_size),
                bytes.len()
            )));
        }
        let is_allocated = bytes[0];
        if is_allocated > 1 {
            return Err(MemoryError::Malformed(format!(
                "page allocation flag {is_allocated}"
            )));
        }

        Ok(Self {
            is_allocated,
            data: bytes[1..=page_size].to_vec(),
            next_page: bytes[page_size + 1],
        })
    }
}
