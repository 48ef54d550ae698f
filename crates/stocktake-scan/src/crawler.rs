//! Crawl entry point.

use std::sync::Arc;

use tokio::sync::broadcast;

use stocktake_core::{CrawlConfig, CrawlError, Inventory};

use crate::classify::Classifier;
use crate::progress::CrawlProgress;
use crate::roots::RootSpec;
use crate::sniff::{ContentSniffer, SignatureSniffer};
use crate::walker::CrawlSession;

/// Reusable crawler; every call to [`Crawler::crawl`] runs in a fresh
/// [`CrawlSession`], so independent crawls never share identity state.
pub struct Crawler {
    config: CrawlConfig,
    sniffer: Arc<dyn ContentSniffer>,
    progress_tx: broadcast::Sender<CrawlProgress>,
}

impl Crawler {
    /// Create a crawler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CrawlConfig::default())
    }

    /// Create a crawler with a configuration.
    pub fn with_config(config: CrawlConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            config,
            sniffer: Arc::new(SignatureSniffer::new()),
            progress_tx,
        }
    }

    /// Replace the content sniffer.
    pub fn with_sniffer(mut self, sniffer: impl ContentSniffer + 'static) -> Self {
        self.sniffer = Arc::new(sniffer);
        self
    }

    /// The crawler's configuration.
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Subscribe to crawl progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlProgress> {
        self.progress_tx.subscribe()
    }

    /// A classifier sharing this crawler's configuration and sniffer.
    pub fn classifier(&self) -> Classifier {
        Classifier::with_sniffer(&self.config, Arc::clone(&self.sniffer))
    }

    /// Start a new crawl session.
    pub fn session(&self) -> CrawlSession {
        CrawlSession::with_classifier(self.config.clone(), self.classifier())
            .with_progress(self.progress_tx.clone())
    }

    /// Crawl every component of `roots`, stamping records with `variant`.
    pub fn crawl(&self, variant: &str, roots: &RootSpec) -> Result<Inventory, CrawlError> {
        self.config.validate()?;
        let components = roots.resolve()?;

        tracing::info!(
            variant,
            components = components.len(),
            parallel = self.config.parallel,
            "starting crawl"
        );

        self.session().walk(&components, variant)
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// Crawl with the default configuration.
pub fn crawl(variant: &str, roots: &RootSpec) -> Result<Inventory, CrawlError> {
    Crawler::new().crawl(variant, roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::sniff::Sniffed;

    struct Shouting;

    impl ContentSniffer for Shouting {
        fn sniff(&self, _prefix: &[u8]) -> Sniffed {
            Sniffed::new("text/x-shout", "LOUD")
        }
    }

    #[test]
    fn test_custom_sniffer() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "quiet").unwrap();

        let crawler = Crawler::new().with_sniffer(Shouting);
        let inventory = crawler
            .crawl("base", &RootSpec::directory(temp.path()))
            .unwrap();

        assert_eq!(inventory.records[0].mime_type, "text/x-shout");
        assert_eq!(inventory.records[0].file_description, "LOUD");
    }

    #[test]
    fn test_progress_per_component() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "1").unwrap();
        fs::write(temp.path().join("b"), "2").unwrap();

        let crawler = Crawler::new();
        let mut rx = crawler.subscribe();
        crawler
            .crawl("base", &RootSpec::directory(temp.path()))
            .unwrap();

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.current_component, "a");
        assert_eq!(second.current_component, "b");
        assert_eq!(second.records, 2);
        assert!(second.component_done);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp = TempDir::new().unwrap();
        let config = CrawlConfig {
            prefix_len: 0,
            ..CrawlConfig::default()
        };

        let result = Crawler::with_config(config).crawl("base", &RootSpec::directory(temp.path()));
        assert!(matches!(result, Err(CrawlError::InvalidConfig { .. })));
    }
}
