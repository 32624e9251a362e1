//! bufpool - a fixed-capacity buffer pool for page-oriented storage.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Access methods (callers)               │
//! │        pin / unpin / new / free / flush             │
//! ├─────────────────────────────────────────────────────┤
//! │              Buffer Pool (buffer/)                  │
//! │   ┌─────────────────────────────────────────────┐   │
//! │   │   Eviction Policies: LRU | MRU (swappable)  │   │
//! │   └─────────────────────────────────────────────┘   │
//! │         BufferManager + Frame + BufferStats         │
//! ├─────────────────────────────────────────────────────┤
//! │             Storage Layer (storage/)                │
//! │        PageStore contract + DiskManager             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The buffer pool owns a bounded number of in-memory frames, each
//! capable of holding one fixed-size page. Callers claim pages through
//! the reference-counted pin protocol; unpinned pages become eviction
//! candidates, and the configured policy picks victims when the pool is
//! full. Dirty pages are written back before their frame is reused.
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Buffer manager, frames, and eviction policies
//! - [`storage`] - The page store contract and disk-backed store
//!
//! # Quick Start
//! ```no_run
//! use bufpool::buffer::{BufferManager, Policy};
//! use bufpool::storage::DiskManager;
//!
//! # fn main() -> bufpool::Result<()> {
//! let store = DiskManager::create("pool.db")?;
//! let mut mgr = BufferManager::new(16, Policy::Lru, store);
//!
//! // Allocate a page, write into it, release the pin
//! let (pid, page) = mgr.new_page(1)?;
//! page.as_mut_slice()[..5].copy_from_slice(b"hello");
//! mgr.unpin_page(pid, true)?;
//!
//! // Later pins see the same bytes, served from the pool
//! let page = mgr.pin_page(pid, false)?;
//! assert_eq!(&page.as_slice()[..5], b"hello");
//! mgr.unpin_page(pid, false)?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, FrameId, PageId, Result};

pub use buffer::{BufferManager, BufferStats, Frame, Policy};
pub use storage::{DiskManager, Page, PageStore};
