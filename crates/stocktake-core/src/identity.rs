//! Storage identity for hardlink deduplication.

use std::fs::Metadata;

use serde::{Deserialize, Serialize};

/// The (device, inode) pair naming one underlying storage unit.
///
/// Two paths with the same identity are hardlinks of the same object.
/// The device is part of the key so crawls spanning several filesystems
/// never conflate unrelated files that happen to share an inode number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageIdentity {
    /// Device ID.
    pub device: u64,
    /// Inode number.
    pub inode: u64,
}

impl StorageIdentity {
    /// Create a new storage identity.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }

    /// Identity of the entry described by `lstat` metadata.
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self::new(metadata.dev(), metadata.ino()))
    }

    /// Identity of the entry described by `lstat` metadata.
    ///
    /// Not available without inode numbers; such entries are never
    /// considered duplicates.
    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
