//! Buffer Manager - the core page caching layer.
//!
//! The [`BufferManager`] provides:
//! - Page caching between the store and memory
//! - Pin-based reference counting
//! - Dirty page write-back
//! - Pluggable eviction policies (LRU / MRU)

use crate::buffer::replacer::{Policy, Replacer};
use crate::buffer::{BufferStats, Frame};
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::{Page, PageStore};

/// Manages a fixed pool of frames caching store pages.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                       BufferManager                         │
/// │  ┌───────────────────────────────────┐  ┌───────────────┐   │
/// │  │        frames: Vec<Frame>         │  │   replacer    │   │
/// │  │  [Frame0] [Frame1] [Frame2] ...   │◀─│  LRU | MRU    │   │
/// │  └───────────────────────────────────┘  └───────────────┘   │
/// │  ┌──────────────┐  ┌──────────────┐                         │
/// │  │    store     │  │    stats     │                         │
/// │  │ S: PageStore │  │ BufferStats  │                         │
/// │  └──────────────┘  └──────────────┘                         │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// The manager exclusively owns its frames, its replacer, and the store.
/// The replacer tracks eviction candidates by frame index only; a frame
/// is a candidate exactly while it holds a page and has no pins.
///
/// # Thread Safety
/// The manager is **single-threaded**: every operation takes `&mut self`
/// and completes synchronously. A multithreaded host must wrap the
/// manager in its own mutual exclusion.
///
/// # Usage
/// ```no_run
/// use bufpool::buffer::{BufferManager, Policy};
/// use bufpool::storage::DiskManager;
///
/// # fn main() -> bufpool::Result<()> {
/// let store = DiskManager::create("pool.db")?;
/// let mut mgr = BufferManager::new(8, Policy::Lru, store);
///
/// let (pid, page) = mgr.new_page(1)?;
/// page.as_mut_slice()[0] = 0xAB;
/// mgr.unpin_page(pid, true)?;
/// mgr.flush_page(pid)?;
/// # Ok(())
/// # }
/// ```
pub struct BufferManager<S: PageStore> {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Eviction policy tracking unpinned resident frames.
    replacer: Box<dyn Replacer>,

    /// The backing page store.
    store: S,

    /// Pin traffic and write-back counters.
    stats: BufferStats,
}

impl<S: PageStore> BufferManager<S> {
    /// Create a new buffer manager.
    ///
    /// # Arguments
    /// * `pool_size` - Number of frames in the pool
    /// * `policy` - Eviction policy for victim selection
    /// * `store` - The backing page store
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, policy: Policy, store: S) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        // Allocate all frames upfront; they start empty
        let frames: Vec<Frame> = (0..pool_size).map(|_| Frame::new()).collect();

        Self {
            frames,
            replacer: policy.build(),
            store,
            stats: BufferStats::new(),
        }
    }

    /// Create a new buffer manager, resolving the policy by name.
    ///
    /// The match is case-insensitive against `"LRU"`; any other name
    /// selects MRU (see [`Policy::from_name`]).
    pub fn with_policy_name(pool_size: usize, policy_name: &str, store: S) -> Self {
        Self::new(pool_size, Policy::from_name(policy_name), store)
    }

    // ========================================================================
    // Public API: Pin protocol
    // ========================================================================

    /// Pin the page `page_id` into the pool and return its buffer.
    ///
    /// If the page is already resident this is a hit: its pin count goes
    /// up and no store I/O happens. Otherwise the page is placed in an
    /// empty frame, or in a frame reclaimed from the eviction policy
    /// (flushing the victim's page first). Unless `is_empty` is true, the
    /// page contents are then read from the store.
    ///
    /// An `is_empty` pin skips the read; the buffer contents are
    /// undefined until the caller writes them.
    ///
    /// The returned borrow is for immediate access. The pin, not the
    /// borrow, is what keeps the frame resident: the page stays in the
    /// pool until a matching [`unpin_page`](Self::unpin_page).
    ///
    /// # Errors
    /// - [`Error::InvalidPageId`] for the invalid sentinel
    /// - [`Error::NoFreeFrames`] if every frame is pinned
    /// - [`Error::PageNotFound`] / [`Error::Io`] if the store read fails;
    ///   the target frame is left empty
    pub fn pin_page(&mut self, page_id: PageId, is_empty: bool) -> Result<&mut Page> {
        let frame_id = self.pin_page_inner(page_id, is_empty)?;
        Ok(self.frames[frame_id.0].page_mut())
    }

    /// Unpin the page `page_id`, marking it dirty if `dirty` is true.
    ///
    /// The dirty flag is sticky: once set it survives clean unpins until
    /// the next successful write-back. When the last pin is released the
    /// frame becomes an eviction candidate.
    ///
    /// # Errors
    /// - [`Error::PageNotResident`] if the page is not in the pool
    /// - [`Error::PageNotPinned`] if its pin count is already zero
    pub fn unpin_page(&mut self, page_id: PageId, dirty: bool) -> Result<()> {
        let frame_id = self
            .find_frame(page_id)
            .ok_or(Error::PageNotResident(page_id.0))?;

        let frame = &mut self.frames[frame_id.0];
        if !frame.is_pinned() {
            return Err(Error::PageNotPinned(page_id.0));
        }

        if dirty {
            frame.mark_dirty();
        }

        if frame.unpin() == 0 {
            self.replacer.add_frame(frame_id);
        }

        Ok(())
    }

    // ========================================================================
    // Public API: Create and free pages
    // ========================================================================

    /// Allocate `how_many` contiguous pages in the store and pin the
    /// first one.
    ///
    /// Returns the first page ID of the run and the pinned buffer. The
    /// remaining `how_many - 1` pages are allocated but not loaded; the
    /// caller owns the whole run and frees it page by page through
    /// [`free_page`](Self::free_page).
    ///
    /// If the pin fails after allocation, the entire run is handed back
    /// to the store before the error surfaces.
    ///
    /// # Errors
    /// - [`Error::InvalidPageCount`] if `how_many` is zero
    /// - [`Error::NoFreeFrames`] if no frame is empty or evictable
    /// - Store errors from allocation or the victim flush
    pub fn new_page(&mut self, how_many: u32) -> Result<(PageId, &mut Page)> {
        if how_many == 0 {
            return Err(Error::InvalidPageCount(how_many));
        }

        let has_room = self
            .frames
            .iter()
            .any(|f| !f.is_valid() || f.is_evictable());
        if !has_room {
            return Err(Error::NoFreeFrames);
        }

        let first_pid = self.store.allocate_pages(how_many)?;

        let frame_id = match self.pin_page_inner(first_pid, true) {
            Ok(frame_id) => frame_id,
            Err(e) => {
                let _ = self.store.deallocate_pages(first_pid, how_many);
                return Err(e);
            }
        };

        Ok((first_pid, self.frames[frame_id.0].page_mut()))
    }

    /// Free the page `page_id`: drop it from the pool and deallocate it
    /// in the store.
    ///
    /// A resident page may carry at most one pin (the caller's own); that
    /// pin is released and the page is written back before the frame is
    /// emptied. The store deallocation decides the returned status;
    /// write-back failures are not surfaced here.
    ///
    /// # Errors
    /// - [`Error::PagePinned`] if other holders remain (pin count > 1)
    /// - Store errors from deallocation
    pub fn free_page(&mut self, page_id: PageId) -> Result<()> {
        if let Some(frame_id) = self.find_frame(page_id) {
            let pin_count = self.frames[frame_id.0].pin_count();
            if pin_count > 1 {
                return Err(Error::PagePinned(page_id.0));
            }
            if pin_count == 1 {
                self.unpin_page(page_id, true)?;
            }
            let _ = self.flush_page(page_id);
        }

        self.store.deallocate_pages(page_id, 1)
    }

    // ========================================================================
    // Public API: Flushing
    // ========================================================================

    /// Flush the page `page_id`: write it back if dirty, then empty its
    /// frame.
    ///
    /// The page must be resident and unpinned.
    ///
    /// # Errors
    /// - [`Error::InvalidPageId`] for the invalid sentinel (the store is
    ///   not touched)
    /// - [`Error::PageNotResident`] if the page is not in the pool
    /// - [`Error::PagePinned`] if the page is pinned
    /// - Store errors from the write; the frame is left resident
    pub fn flush_page(&mut self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        let frame_id = self
            .find_frame(page_id)
            .ok_or(Error::PageNotResident(page_id.0))?;

        let frame = &mut self.frames[frame_id.0];
        if frame.is_pinned() {
            return Err(Error::PagePinned(page_id.0));
        }

        if frame.is_dirty() {
            frame.write(&mut self.store)?;
            self.stats.record_dirty_write();
        }

        self.replacer.remove_frame(frame_id);
        self.frames[frame_id.0].reset();
        Ok(())
    }

    /// Flush every unpinned page in the pool and empty its frame.
    ///
    /// Pinned frames are skipped and left resident; a frame whose
    /// write-back fails is also left resident. The walk never
    /// short-circuits.
    ///
    /// # Errors
    /// [`Error::FlushIncomplete`] with the number of frames left
    /// resident, if any were.
    pub fn flush_all_pages(&mut self) -> Result<()> {
        let mut resident = 0usize;

        for index in 0..self.frames.len() {
            let frame = &mut self.frames[index];
            if !frame.is_valid() {
                continue;
            }
            if frame.is_pinned() {
                resident += 1;
                continue;
            }
            if frame.is_dirty() {
                if frame.write(&mut self.store).is_err() {
                    resident += 1;
                    continue;
                }
                self.stats.record_dirty_write();
            }

            self.replacer.remove_frame(FrameId::new(index));
            self.frames[index].reset();
        }

        if resident == 0 {
            Ok(())
        } else {
            Err(Error::FlushIncomplete(resident))
        }
    }

    // ========================================================================
    // Public API: Introspection
    // ========================================================================

    /// Number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    /// Number of frames with no pins, whether or not they hold a page.
    pub fn unpinned_frame_count(&self) -> usize {
        self.frames.iter().filter(|f| !f.is_pinned()).count()
    }

    /// Number of frames currently holding a page.
    pub fn resident_page_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_valid()).count()
    }

    /// Find the frame holding `page_id`. Linear scan, no side effects.
    pub fn find_frame(&self, page_id: PageId) -> Option<FrameId> {
        self.frames
            .iter()
            .position(|f| f.is_valid() && f.page_id() == page_id)
            .map(FrameId::new)
    }

    /// True if `page_id` is resident in the pool.
    pub fn contains_page(&self, page_id: PageId) -> bool {
        self.find_frame(page_id).is_some()
    }

    /// Pin count of `page_id`, or `None` if it is not resident.
    pub fn get_pin_count(&self, page_id: PageId) -> Option<u32> {
        self.find_frame(page_id)
            .map(|frame_id| self.frames[frame_id.0].pin_count())
    }

    // ========================================================================
    // Public API: Statistics
    // ========================================================================

    /// Get the pin traffic and write-back counters.
    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Zero all counters.
    pub fn reset_stat(&mut self) {
        self.stats.reset();
    }

    /// Print the statistics report to stdout.
    pub fn print_stat(&self) {
        println!("{}", self.stats);
    }

    // ========================================================================
    // Internal: Core pin logic
    // ========================================================================

    /// Pin a page into the pool, returning its frame index.
    fn pin_page_inner(&mut self, page_id: PageId, is_empty: bool) -> Result<FrameId> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        self.stats.record_call();

        // Hit path: the page is already resident
        if let Some(frame_id) = self.find_frame(page_id) {
            self.stats.record_hit();
            self.frames[frame_id.0].pin();
            self.replacer.remove_frame(frame_id);
            return Ok(frame_id);
        }

        // Miss path: take an empty frame, or reclaim one from the policy
        let frame_id = match self.find_empty_frame() {
            Some(frame_id) => frame_id,
            None => self.evict_victim()?,
        };

        let frame = &mut self.frames[frame_id.0];
        frame.set_page_id(page_id);
        frame.pin();

        if !is_empty {
            if let Err(e) = frame.read(&mut self.store, page_id) {
                // Leave nothing half-bound: the frame goes back to empty
                frame.reset();
                self.replacer.remove_frame(frame_id);
                return Err(e);
            }
        }

        // Pinned frames are never eviction candidates
        self.replacer.remove_frame(frame_id);
        Ok(frame_id)
    }

    /// Find a frame not currently holding a page.
    fn find_empty_frame(&self) -> Option<FrameId> {
        self.frames
            .iter()
            .position(|f| !f.is_valid())
            .map(FrameId::new)
    }

    /// Ask the policy for a victim and flush its page, leaving the frame
    /// empty for reuse.
    fn evict_victim(&mut self) -> Result<FrameId> {
        let victim = self.replacer.pick_victim().ok_or(Error::NoFreeFrames)?;
        let victim_pid = self.frames[victim.0].page_id();

        match self.flush_page(victim_pid) {
            Ok(()) => Ok(victim),
            Err(e) => {
                // The victim is still resident and unpinned, so it stays
                // a candidate
                self.replacer.add_frame(victim);
                Err(e)
            }
        }
    }
}

impl<S: PageStore> Drop for BufferManager<S> {
    /// Best-effort flush of every page; failures are swallowed.
    fn drop(&mut self) {
        let _ = self.flush_all_pages();
    }
}
