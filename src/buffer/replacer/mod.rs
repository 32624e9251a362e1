//! Eviction policy implementations (replacers).
//!
//! A replacer owns the ordered set of *eviction candidates*: frames that
//! currently hold a page and have no pins. The buffer manager keeps the
//! candidate set in sync with frame state and asks the replacer for a
//! victim when the pool is full.
//!
//! Implemented policies:
//! - [`LruReplacer`] - evicts the least recently added/refreshed candidate
//! - [`MruReplacer`] - evicts the most recently added/refreshed candidate

mod lru;
mod mru;

pub use lru::LruReplacer;
pub use mru::MruReplacer;

use crate::common::FrameId;

/// An eviction policy over buffer frames.
///
/// Implementations track candidates by [`FrameId`] only; they never see
/// frame contents. Candidate order encodes recency of `add_frame` calls.
pub trait Replacer {
    /// Choose a victim, removing it from the candidate set.
    ///
    /// Returns `None` when there are no candidates.
    fn pick_victim(&mut self) -> Option<FrameId>;

    /// Declare `frame_id` a candidate.
    ///
    /// If it is already a candidate it is moved to the recency-newest
    /// position: re-adding is how a candidate is "touched".
    fn add_frame(&mut self, frame_id: FrameId);

    /// Declare `frame_id` no longer a candidate. No-op if absent.
    fn remove_frame(&mut self, frame_id: FrameId);
}

/// Selector for the replacement policy a buffer manager is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Least recently used.
    Lru,
    /// Most recently used.
    Mru,
}

impl Policy {
    /// Resolve a policy from its name, case-insensitively.
    ///
    /// Anything that is not `"LRU"` selects MRU. This mirrors the
    /// selector contract of classic buffer manager teaching code, where
    /// the policy string silently defaults.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("lru") {
            Policy::Lru
        } else {
            Policy::Mru
        }
    }

    /// Build a fresh replacer for this policy.
    pub(crate) fn build(self) -> Box<dyn Replacer> {
        match self {
            Policy::Lru => Box::new(LruReplacer::new()),
            Policy::Mru => Box::new(MruReplacer::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_name_case_insensitive() {
        assert_eq!(Policy::from_name("LRU"), Policy::Lru);
        assert_eq!(Policy::from_name("lru"), Policy::Lru);
        assert_eq!(Policy::from_name("Lru"), Policy::Lru);
    }

    #[test]
    fn test_policy_from_name_defaults_to_mru() {
        assert_eq!(Policy::from_name("MRU"), Policy::Mru);
        assert_eq!(Policy::from_name("clock"), Policy::Mru);
        assert_eq!(Policy::from_name(""), Policy::Mru);
    }
}
