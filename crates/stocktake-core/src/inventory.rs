//! Inventory container and statistics.

use std::time::Duration;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::{CrawlWarning, SkipReason};
use crate::record::{EntryKind, InventoryRecord};

/// Summary statistics for one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// Sum of all record sizes in bytes.
    pub total_size: u64,
    /// Number of regular file records.
    pub total_files: u64,
    /// Number of directory records.
    pub total_dirs: u64,
    /// Number of symlink records.
    pub total_symlinks: u64,
    /// Number of top-level components crawled.
    pub components: u64,
    /// Entries dropped because their storage identity was already recorded.
    pub duplicates_skipped: u64,
    /// Unreadable lock files dropped.
    pub lock_files_skipped: u64,
    /// Entries that vanished during the crawl.
    pub vanished_skipped: u64,
}

impl InventoryStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for an emitted record.
    pub fn record(&mut self, record: &InventoryRecord) {
        self.total_size += record.size;
        match record.kind() {
            EntryKind::File => self.total_files += 1,
            EntryKind::Directory => self.total_dirs += 1,
            EntryKind::Symlink => self.total_symlinks += 1,
        }
    }

    /// Account for a skipped entry.
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Duplicate => self.duplicates_skipped += 1,
            SkipReason::LockFile => self.lock_files_skipped += 1,
            SkipReason::Vanished => self.vanished_skipped += 1,
        }
    }

    /// Fold another set of stats into this one.
    pub fn merge(&mut self, other: &InventoryStats) {
        self.total_size += other.total_size;
        self.total_files += other.total_files;
        self.total_dirs += other.total_dirs;
        self.total_symlinks += other.total_symlinks;
        self.components += other.components;
        self.duplicates_skipped += other.duplicates_skipped;
        self.lock_files_skipped += other.lock_files_skipped;
        self.vanished_skipped += other.vanished_skipped;
    }

    /// Number of records accounted for.
    pub fn total_records(&self) -> u64 {
        self.total_files + self.total_dirs + self.total_symlinks
    }
}

/// The result of one crawl: every retained entry, in traversal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// Label stamped on every record.
    pub variant: CompactString,
    /// Records in traversal order.
    pub records: Vec<InventoryRecord>,
    /// Crawl statistics.
    pub stats: InventoryStats,
    /// Non-fatal anomalies.
    pub warnings: Vec<CrawlWarning>,
    /// Wall-clock time of the crawl.
    pub crawl_duration: Duration,
}

impl Inventory {
    /// Create an empty inventory for a variant.
    pub fn new(variant: impl Into<CompactString>) -> Self {
        Self {
            variant: variant.into(),
            records: Vec::new(),
            stats: InventoryStats::new(),
            warnings: Vec::new(),
            crawl_duration: Duration::ZERO,
        }
    }

    /// Append a record, updating the statistics.
    pub fn push(&mut self, record: InventoryRecord) {
        self.stats.record(&record);
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the inventory holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all record sizes.
    pub fn total_size(&self) -> u64 {
        self.stats.total_size
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, InventoryRecord> {
        self.records.iter()
    }

    /// Records belonging to one component.
    pub fn component<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a InventoryRecord> + 'a {
        self.records.iter().filter(move |r| r.component == name)
    }

    /// Distinct component names, in first-seen order.
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.component.as_str()) {
                names.push(record.component.as_str());
            }
        }
        names
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a InventoryRecord;
    type IntoIter = std::slice::Iter<'a, InventoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
