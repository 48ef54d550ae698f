//! Filesystem inventory crawler for stocktake.
//!
//! This crate walks top-level components (typically the entries of a
//! content-addressed package store) and produces one inventory record per
//! distinct storage unit.
//!
//! # Overview
//!
//! - **Deduplication** by (device, inode), shared across components
//! - **Bounded content sniffing**: at most a fixed prefix of each file is read
//! - **Tolerant of lock files** that vanish or are busy; any other unreadable
//!   file aborts the crawl
//! - **Optional parallelism** across components via rayon
//!
//! # Example
//!
//! ```rust,no_run
//! use stocktake_scan::{Crawler, RootSpec};
//!
//! let crawler = Crawler::new();
//! let inventory = crawler
//!     .crawl("base", &RootSpec::directory("/nix/store"))
//!     .unwrap();
//!
//! println!("{} records, {} bytes", inventory.len(), inventory.total_size());
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use stocktake_scan::{Crawler, RootSpec};
//!
//! let crawler = Crawler::new();
//! let mut progress_rx = crawler.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         eprintln!("{} records so far", progress.records);
//!     }
//! });
//!
//! let _ = crawler.crawl("base", &RootSpec::directory("/nix/store"));
//! ```

mod classify;
mod crawler;
mod identity;
mod progress;
mod roots;
mod sniff;
mod walker;

pub use classify::{ClassifyOutcome, Classifier};
pub use crawler::{Crawler, crawl};
pub use identity::IdentityTracker;
pub use progress::CrawlProgress;
pub use roots::RootSpec;
pub use sniff::{ContentSniffer, SignatureSniffer, Sniffed};
pub use walker::CrawlSession;

// Re-export core types for convenience
pub use stocktake_core::{
    Classification, CrawlConfig, CrawlError, CrawlWarning, EntryKind, Inventory,
    InventoryRecord, InventoryStats, SkipReason, StorageIdentity, UnsupportedKind, WarningKind,
};
