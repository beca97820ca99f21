use super::page::Page;

/// One slot of the memory account's lookup table.
///
/// On the wire: `size:2 (LE) ‖ page:1 ‖ sector:1`. A slot is empty exactly
/// when `size == 0`; `page` and `sector` mean nothing in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountIndex {
    pub size: u16,
    pub page: u8,
    pub sector: u8,
}

impl AccountIndex {
    pub const LEN: usize = 2 + 1 + 1;

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_allocated(&self) -> bool {
        !self.is_empty()
    }

    pub fn num_pages(&self, page_size: usize) -> usize {
        Page::calc_num_pages_needed(self.size as usize, page_size)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_bytes(self) -> [u8; Self::LEN] {
        let [lo, hi] = self.size.to_le_bytes();
        [lo, hi, self.page, self.sector]
    }

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self {
            size: u16::from_le_bytes([bytes[0], bytes[1]]),
            page: bytes[2],
            sector: bytes[3],
        }
    }
}
