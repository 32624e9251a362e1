//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus metadata needed for buffer management:
//! - Which page is loaded (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking

use crate::common::{PageId, Result};
use crate::storage::{Page, PageStore};

/// A frame in the buffer pool.
///
/// Frames are the "slots" in the buffer pool. Each frame can hold one page.
/// The pool has a fixed number of frames allocated at startup; the page
/// buffer lives for the whole lifetime of the frame and is never
/// reallocated - only its contents and the bound page ID change.
///
/// State invariants maintained by the buffer manager:
/// - an empty frame (`page_id == PageId::INVALID`) is unpinned and clean
/// - a pinned frame is never chosen as an eviction victim
pub struct Frame {
    /// The page data.
    page: Page,

    /// Which page is currently loaded, or `PageId::INVALID` if the frame
    /// is empty.
    page_id: PageId,

    /// Number of active pins on this frame.
    pin_count: u32,

    /// Whether the page has been modified since it was last read from or
    /// written to the store.
    dirty: bool,
}

impl Frame {
    /// Create a new empty frame.
    pub fn new() -> Self {
        Self {
            page: Page::new(),
            page_id: PageId::INVALID,
            pin_count: 0,
            dirty: false,
        }
    }

    // ========================================================================
    // Page access
    // ========================================================================

    /// Borrow the page data.
    #[inline]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutably borrow the page data.
    #[inline]
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    // ========================================================================
    // Page ID management
    // ========================================================================

    /// Get the ID of the loaded page (`PageId::INVALID` when empty).
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Bind the frame to a new page identifier.
    #[inline]
    pub fn set_page_id(&mut self, page_id: PageId) {
        self.page_id = page_id;
    }

    // ========================================================================
    // Pin count operations
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if the pin count is already 0. The buffer manager checks
    /// `is_pinned` before unpinning, so this fires only on caller bugs.
    #[inline]
    pub fn unpin(&mut self) -> u32 {
        assert!(self.pin_count > 0, "pin count underflow");
        self.pin_count -= 1;
        self.pin_count
    }

    /// Get the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    /// Check if the frame is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    // ========================================================================
    // Dirty flag operations
    // ========================================================================

    /// Mark the frame as dirty (modified).
    ///
    /// Dirty is sticky: it stays set until the next successful write to
    /// the store.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the frame is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ========================================================================
    // Frame state queries
    // ========================================================================

    /// Check if the frame holds a page.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.page_id.is_valid()
    }

    /// Check if the frame can be evicted (holds a page, no pins).
    #[inline]
    pub fn is_evictable(&self) -> bool {
        self.is_valid() && !self.is_pinned()
    }

    // ========================================================================
    // Store I/O
    // ========================================================================

    /// Fill the frame's buffer from the store page `page_id`.
    ///
    /// On success the frame is bound to `page_id` and is clean: a freshly
    /// loaded page has not diverged from the store. On failure the frame's
    /// identity and buffer contents are left unchanged.
    pub fn read(&mut self, store: &mut dyn PageStore, page_id: PageId) -> Result<()> {
        store.read_page(page_id, &mut self.page)?;
        self.page_id = page_id;
        self.dirty = false;
        Ok(())
    }

    /// Persist the frame's buffer under its current page ID.
    ///
    /// Clears the dirty flag on success. The frame must be valid.
    pub fn write(&mut self, store: &mut dyn PageStore) -> Result<()> {
        store.write_page(self.page_id, &self.page)?;
        self.dirty = false;
        Ok(())
    }

    /// Reset the frame to empty state.
    ///
    /// Buffer contents are not scrubbed; they are logically undefined
    /// until the next load.
    pub fn reset(&mut self) {
        self.page_id = PageId::INVALID;
        self.pin_count = 0;
        self.dirty = false;
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new() {
        let frame = Frame::new();
        assert!(!frame.is_valid());
        assert!(!frame.is_pinned());
        assert!(!frame.is_dirty());
        assert_eq!(frame.pin_count(), 0);
        assert_eq!(frame.page_id(), PageId::INVALID);
    }

    #[test]
    fn test_frame_pin_unpin() {
        let mut frame = Frame::new();

        assert_eq!(frame.pin(), 1);
        assert!(frame.is_pinned());

        assert_eq!(frame.pin(), 2);
        assert_eq!(frame.pin_count(), 2);

        assert_eq!(frame.unpin(), 1);
        assert!(frame.is_pinned());

        assert_eq!(frame.unpin(), 0);
        assert!(!frame.is_pinned());
    }

    #[test]
    #[should_panic(expected = "pin count underflow")]
    fn test_frame_unpin_underflow() {
        let mut frame = Frame::new();
        frame.unpin();
    }

    #[test]
    fn test_frame_dirty_flag() {
        let mut frame = Frame::new();
        assert!(!frame.is_dirty());

        frame.mark_dirty();
        assert!(frame.is_dirty());
    }

    #[test]
    fn test_frame_page_access() {
        let mut frame = Frame::new();

        frame.page_mut().as_mut_slice()[0] = 0xAB;
        assert_eq!(frame.page().as_slice()[0], 0xAB);
    }

    #[test]
    fn test_frame_page_id() {
        let mut frame = Frame::new();
        assert!(!frame.is_valid());

        frame.set_page_id(PageId::new(42));
        assert_eq!(frame.page_id(), PageId::new(42));
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_evictable() {
        let mut frame = Frame::new();

        // Empty frame is not evictable
        assert!(!frame.is_evictable());

        // Bind a page
        frame.set_page_id(PageId::new(1));
        assert!(frame.is_evictable());

        // Pin it
        frame.pin();
        assert!(!frame.is_evictable());

        // Unpin it
        frame.unpin();
        assert!(frame.is_evictable());
    }

    #[test]
    fn test_frame_reset_keeps_buffer_contents() {
        let mut frame = Frame::new();

        frame.set_page_id(PageId::new(99));
        frame.pin();
        frame.mark_dirty();
        frame.page_mut().as_mut_slice()[100] = 0xFF;

        frame.reset();

        assert!(!frame.is_valid());
        assert!(!frame.is_pinned());
        assert!(!frame.is_dirty());
        // The buffer is not scrubbed, only the metadata
        assert_eq!(frame.page().as_slice()[100], 0xFF);
    }
}
