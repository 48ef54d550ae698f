//! Core types for stocktake.
//!
//! This crate holds the data model shared by the crawler and the exporters:
//! inventory records, storage identities, classifications, crawl
//! configuration and the error taxonomy.

mod config;
mod error;
mod identity;
mod inventory;
mod record;

pub use config::{CrawlConfig, CrawlConfigBuilder, CrawlConfigBuilderError, DEFAULT_PREFIX_LEN};
pub use error::{CrawlError, CrawlWarning, SkipReason, WarningKind};
pub use identity::StorageIdentity;
pub use inventory::{Inventory, InventoryStats};
pub use record::{
    Classification, DIRECTORY_DESCRIPTION, DIRECTORY_MIME, EntryKind, InventoryRecord,
    SYMLINK_DESCRIPTION, SYMLINK_MIME, UnsupportedKind,
};
