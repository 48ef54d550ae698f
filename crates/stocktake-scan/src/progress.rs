//! Crawl progress reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use compact_str::CompactString;
use tokio::sync::broadcast;

/// Records between two periodic progress updates.
const PROGRESS_INTERVAL: u64 = 1000;

/// Progress information during a crawl.
#[derive(Debug, Clone)]
pub struct CrawlProgress {
    /// Records emitted so far.
    pub records: u64,
    /// Bytes accounted for so far.
    pub bytes: u64,
    /// Component being crawled.
    pub current_component: CompactString,
    /// Whether this update marks the end of `current_component`.
    pub component_done: bool,
    /// Time elapsed since the crawl started.
    pub elapsed: Duration,
}

impl CrawlProgress {
    /// Calculate crawl rate in records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.records as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Shared progress counters for one crawl session.
///
/// Counters are atomic so a parallel crawl can report through one reporter.
#[derive(Debug)]
pub(crate) struct ProgressReporter {
    tx: Option<broadcast::Sender<CrawlProgress>>,
    start: Instant,
    records: AtomicU64,
    bytes: AtomicU64,
}

impl ProgressReporter {
    pub fn new(tx: Option<broadcast::Sender<CrawlProgress>>) -> Self {
        Self {
            tx,
            start: Instant::now(),
            records: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    pub fn record(&self, size: u64, component: &str) {
        let count = self.records.fetch_add(1, Ordering::Relaxed) + 1;
        self.bytes.fetch_add(size, Ordering::Relaxed);
        if count % PROGRESS_INTERVAL == 0 {
            self.publish(component, false);
        }
    }

    pub fn component_done(&self, component: &str) {
        self.publish(component, true);
    }

    fn publish(&self, component: &str, component_done: bool) {
        if let Some(tx) = &self.tx {
            // No subscribers is fine.
            let _ = tx.send(CrawlProgress {
                records: self.records.load(Ordering::Relaxed),
                bytes: self.bytes.load(Ordering::Relaxed),
                current_component: component.into(),
                component_done,
                elapsed: self.start.elapsed(),
            });
        }
    }
}
