use thiserror::Error;

use crate::account::CodecError;

/// Errors from the memory allocators and the memory-account parser.
///
/// Allocator errors are raised before anything is touched: a failed
/// `write` or `free` leaves every page and index entry as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("memory slot {0} is empty")]
    SlotEmpty(u16),

    #[error("memory slot {0} is already allocated")]
    SlotOccupied(u16),

    #[error("no sector has room for {size} bytes")]
    OutOfSpace { size: usize },

    #[error("memory slot {index} out of range (capacity {capacity})")]
    IndexOutOfRange { index: u16, capacity: usize },

    #[error("refusing to store an empty record")]
    EmptyData,

    #[error("slot {index} holds {allocated} bytes, cannot write {requested}")]
    InsufficientSize {
        index: u16,
        allocated: usize,
        requested: usize,
    },

    #[error("invalid memory config: {0}")]
    InvalidConfig(String),

    #[error("malformed memory data: {0}")]
    Malformed(String),

    #[error("unknown memory layout {0}")]
    UnknownLayout(u8),

    #[error("account codec error: {0}")]
    Codec(#[from] CodecError),
}

pub type MemoryResult<T> = Result<T, MemoryError>;
