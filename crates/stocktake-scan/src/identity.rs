//! Storage identity tracking for hardlink deduplication.

use dashmap::DashSet;
use stocktake_core::StorageIdentity;

/// Tracks storage identities claimed during one crawl.
///
/// The set is concurrent so components crawled on different threads share
/// one view: [`IdentityTracker::claim`] is an atomic insert, so exactly one
/// caller admits any given identity.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: DashSet<StorageIdentity>,
}

impl IdentityTracker {
    /// Create a new identity tracker.
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Claim an identity. Returns `true` if this is the first claim.
    ///
    /// A `false` return means another path already stands for the same
    /// storage unit and this one must be dropped.
    pub fn claim(&self, identity: StorageIdentity) -> bool {
        self.seen.insert(identity)
    }

    /// Claim an optional identity; entries without one are always admitted.
    pub fn admit(&self, identity: Option<StorageIdentity>) -> bool {
        identity.is_none_or(|id| self.claim(id))
    }

    /// Check if an identity has been claimed (without claiming it).
    pub fn has_seen(&self, identity: &StorageIdentity) -> bool {
        self.seen.contains(identity)
    }

    /// Get the number of distinct identities claimed.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing has been claimed.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
