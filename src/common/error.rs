//! Error types for the buffer pool.

use std::fmt;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in the buffer pool and its backing store.
///
/// By having a single error type, error handling stays consistent across
/// the manager, the policies, and the store implementations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from store operations.
    ///
    /// This wraps `std::io::Error` from file read/write operations.
    Io(std::io::Error),

    /// Requested page does not exist in the backing store, or was
    /// deallocated.
    PageNotFound(u32),

    /// Buffer pool has no empty frames and no eviction candidates.
    ///
    /// This happens when all frames are pinned.
    NoFreeFrames,

    /// The invalid sentinel page ID was passed where a real page was
    /// required.
    InvalidPageId(u32),

    /// `new_page` was asked to allocate zero pages.
    InvalidPageCount(u32),

    /// The page is not resident in the buffer pool.
    PageNotResident(u32),

    /// Attempted to unpin a page whose pin count is already zero.
    ///
    /// This indicates a caller bug - unpinning should match pinning.
    PageNotPinned(u32),

    /// The operation requires the page to be unpinned (or pinned at most
    /// once, for `free_page`), but other holders remain.
    PagePinned(u32),

    /// `flush_all_pages` could not empty every frame. Carries the number
    /// of frames left resident.
    FlushIncomplete(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::PageNotFound(pid) => write!(f, "Page {} not found in store", pid),
            Error::NoFreeFrames => write!(f, "No free frames available in buffer pool"),
            Error::InvalidPageId(pid) => write!(f, "Invalid page ID: {}", pid),
            Error::InvalidPageCount(n) => write!(f, "Invalid page count: {}", n),
            Error::PageNotResident(pid) => write!(f, "Page {} is not in the buffer pool", pid),
            Error::PageNotPinned(pid) => write!(f, "Page {} is not pinned", pid),
            Error::PagePinned(pid) => write!(f, "Page {} is still pinned", pid),
            Error::FlushIncomplete(n) => write!(f, "Flush left {} frame(s) resident", n),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            // I/O errors have a source (the underlying std::io::Error)
            Error::Io(e) => Some(e),
            // Our custom errors don't have a source
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotResident(42);
        assert_eq!(format!("{}", err), "Page 42 is not in the buffer pool");

        let err = Error::NoFreeFrames;
        assert_eq!(format!("{}", err), "No free frames available in buffer pool");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        // This function returns our Result type
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
