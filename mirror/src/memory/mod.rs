//! # Account Memory
//!
//! Where hot accounts live: a fixed-capacity slab of linked pages, mirrored
//! from a VM memory account.
//!
//! ```text
//! layout.rs         page size per memory layout
//! page.rs           one page: flag, data, next link
//! sector.rs         255 pages, chain allocation and walking
//! account_index.rs  slot table entry: size, first page, sector
//! paged.rs          PagedMemory: the slab, plus its wire format
//! simple.rs         SimpleMemory: fixed-size slots, no chaining
//! allocator.rs      MemoryAllocator: what both of them can do
//! header.rs         the memory account header in front of the slab
//! config.rs         slot/sector counts and presets
//! ```
//!
//! Everything is owned, sized at construction, and never resized. Bring
//! [`MemoryAllocator`] into scope to read and write.

pub mod account_index;
pub mod allocator;
pub mod config;
pub mod error;
pub mod header;
pub mod layout;
pub mod page;
pub mod paged;
pub mod sector;
pub mod simple;

pub use account_index::AccountIndex;
pub use allocator::MemoryAllocator;
pub use config::MemoryConfig;
pub use error::{MemoryError, MemoryResult};
pub use header::MemoryAccountHeader;
pub use layout::MemoryLayout;
pub use page::{Page, PageReference};
pub use paged::PagedMemory;
pub use sector::Sector;
pub use simple::SimpleMemory;
