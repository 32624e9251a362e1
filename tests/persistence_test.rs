//! Persistence tests for the buffer pool over a disk-backed store.
//!
//! These verify cross-component behavior the unit tests don't cover:
//! write-back through evictions, flush-then-reopen, and the destructor
//! flush.

use bufpool::buffer::{BufferManager, Policy};
use bufpool::storage::DiskManager;
use rand::RngCore;
use tempfile::tempdir;

#[test]
fn test_data_persistence_across_evictions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let dm = DiskManager::create(&path).unwrap();
    let mut mgr = BufferManager::new(2, Policy::Lru, dm);

    // Create 5 pages with unique data (forces evictions)
    let mut page_ids = vec![];
    for i in 0u8..5 {
        let (pid, page) = mgr.new_page(1).unwrap();
        page.as_mut_slice()[0] = i;
        page.as_mut_slice()[1] = i.wrapping_mul(3);
        mgr.unpin_page(pid, true).unwrap();
        page_ids.push(pid);
    }

    // Read all back - verifies evicted pages were flushed
    for (i, &pid) in page_ids.iter().enumerate() {
        let page = mgr.pin_page(pid, false).unwrap();
        assert_eq!(page.as_slice()[0], i as u8);
        assert_eq!(page.as_slice()[1], (i as u8).wrapping_mul(3));
        mgr.unpin_page(pid, false).unwrap();
    }
}

#[test]
fn test_flush_all_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let data = b"persistent!";

    let pid;

    // First session: create and write
    {
        let dm = DiskManager::create(&path).unwrap();
        let mut mgr = BufferManager::new(10, Policy::Lru, dm);

        let (new_pid, page) = mgr.new_page(1).unwrap();
        pid = new_pid;
        page.as_mut_slice()[..data.len()].copy_from_slice(data);
        mgr.unpin_page(pid, true).unwrap();

        mgr.flush_all_pages().unwrap();
    }

    // Second session: verify data
    {
        let dm = DiskManager::open(&path).unwrap();
        let mut mgr = BufferManager::new(10, Policy::Lru, dm);

        let page = mgr.pin_page(pid, false).unwrap();
        assert_eq!(&page.as_slice()[..data.len()], data);
        mgr.unpin_page(pid, false).unwrap();
    }
}

#[test]
fn test_drop_flushes_dirty_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let pid;

    // No explicit flush: dropping the manager writes the page back
    {
        let dm = DiskManager::create(&path).unwrap();
        let mut mgr = BufferManager::new(4, Policy::Lru, dm);

        let (new_pid, page) = mgr.new_page(1).unwrap();
        pid = new_pid;
        page.as_mut_slice()[0] = 0x42;
        mgr.unpin_page(pid, true).unwrap();
    }

    {
        let dm = DiskManager::open(&path).unwrap();
        let mut mgr = BufferManager::new(4, Policy::Lru, dm);

        let page = mgr.pin_page(pid, false).unwrap();
        assert_eq!(page.as_slice()[0], 0x42);
        mgr.unpin_page(pid, false).unwrap();
    }
}

#[test]
fn test_random_contents_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let dm = DiskManager::create(&path).unwrap();

    // Pool much smaller than the working set, so most pins miss
    let mut mgr = BufferManager::new(4, Policy::Lru, dm);
    let mut rng = rand::thread_rng();

    let mut expected = vec![];
    for _ in 0..16 {
        let mut bytes = [0u8; 64];
        rng.fill_bytes(&mut bytes);

        let (pid, page) = mgr.new_page(1).unwrap();
        page.as_mut_slice()[..64].copy_from_slice(&bytes);
        mgr.unpin_page(pid, true).unwrap();
        expected.push((pid, bytes));
    }

    for (pid, bytes) in &expected {
        let page = mgr.pin_page(*pid, false).unwrap();
        assert_eq!(&page.as_slice()[..64], &bytes[..]);
        mgr.unpin_page(*pid, false).unwrap();
    }
}

#[test]
fn test_mru_workload_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let dm = DiskManager::create(&path).unwrap();
    let mut mgr = BufferManager::new(3, Policy::Mru, dm);

    let mut page_ids = vec![];
    for i in 0u8..6 {
        let (pid, page) = mgr.new_page(1).unwrap();
        page.as_mut_slice()[100] = i;
        mgr.unpin_page(pid, true).unwrap();
        page_ids.push(pid);
    }

    // Whatever the eviction order was, every page reads back intact
    for (i, &pid) in page_ids.iter().enumerate() {
        let page = mgr.pin_page(pid, false).unwrap();
        assert_eq!(page.as_slice()[100], i as u8);
        mgr.unpin_page(pid, false).unwrap();
    }
}
