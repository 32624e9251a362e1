//! Disk Manager - low-level file I/O for pages.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating and deallocating page runs
//! - Managing the store file

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::store::PageStore;

/// Manages disk I/O for a single store file.
///
/// # File Layout
/// The store is a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// # Allocation
/// `allocate_pages(count)` appends a contiguous zeroed run to the end of
/// the file, so a multi-page run always has consecutive identifiers.
/// Deallocated identifiers are retired, not recycled: reading or writing
/// a deallocated page fails with [`Error::PageNotFound`].
///
/// # Thread Safety
/// `DiskManager` is **single-threaded**, like the buffer pool that owns it.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct DiskManager {
    file: File,
    /// Number of pages ever allocated in the file.
    page_count: u32,
    /// Identifiers that have been deallocated.
    retired: HashSet<u32>,
}

impl DiskManager {
    /// Create a new store file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            retired: HashSet::new(),
        })
    }

    /// Open an existing store file.
    ///
    /// Deallocation state is not persisted; every page within the file
    /// size is considered live after a reopen.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        // Calculate page count from file size
        let metadata = file.metadata()?;
        let file_size = metadata.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            page_count,
            retired: HashSet::new(),
        })
    }

    /// Open an existing store file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Get the number of pages ever allocated.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Get the total size of the store file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    /// True if `page_id` is allocated and not retired.
    fn is_live(&self, page_id: PageId) -> bool {
        page_id.is_valid() && page_id.0 < self.page_count && !self.retired.contains(&page_id.0)
    }
}

impl PageStore for DiskManager {
    fn allocate_pages(&mut self, count: u32) -> Result<PageId> {
        let first = PageId::new(self.page_count);

        // Extend the file with a zeroed run
        let offset = (first.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;

        let zeros = [0u8; PAGE_SIZE];
        for _ in 0..count {
            self.file.write_all(&zeros)?;
        }
        self.file.sync_all()?;

        self.page_count += count;
        Ok(first)
    }

    fn deallocate_pages(&mut self, first: PageId, count: u32) -> Result<()> {
        if !first.is_valid() || first.0 as u64 + count as u64 > self.page_count as u64 {
            return Err(Error::PageNotFound(first.0));
        }

        for pid in first.0..first.0 + count {
            self.retired.insert(pid);
        }
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(page.as_mut_slice())?;

        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_all()?; // fsync for durability

        Ok(())
    }
}
