//! Deduplicating walker over top-level components.
//!
//! A [`CrawlSession`] owns the identity set for exactly one crawl. Each
//! component is walked depth-first with children sorted by name, symlinks
//! are never followed, and an entry whose storage identity was already
//! claimed is dropped together with its subtree. The set is shared across
//! components, so a hardlink spanning two components is recorded once,
//! under whichever component claims it first.

use std::fs::Metadata;
use std::path::Path;
use std::time::Instant;

use compact_str::CompactString;
use rayon::prelude::*;
use tokio::sync::broadcast;
use walkdir::WalkDir;

use stocktake_core::{
    CrawlConfig, CrawlError, CrawlWarning, Inventory, InventoryRecord, InventoryStats,
    SkipReason, StorageIdentity,
};

use crate::classify::{ClassifyOutcome, Classifier};
use crate::identity::IdentityTracker;
use crate::progress::{CrawlProgress, ProgressReporter};

/// State of a single crawl.
#[derive(Debug)]
pub struct CrawlSession {
    config: CrawlConfig,
    classifier: Classifier,
    tracker: IdentityTracker,
    progress: ProgressReporter,
}

/// Records and bookkeeping gathered from one component.
#[derive(Debug, Default)]
struct ComponentWalk {
    records: Vec<InventoryRecord>,
    stats: InventoryStats,
    warnings: Vec<CrawlWarning>,
}

impl ComponentWalk {
    fn skip(&mut self, path: &Path, reason: SkipReason) {
        tracing::debug!(path = %path.display(), %reason, "entry skipped");
        self.stats.record_skip(reason);
    }

    fn vanished(&mut self, path: &Path) {
        self.skip(path, SkipReason::Vanished);
        self.warnings.push(CrawlWarning::vanished(path));
    }
}

impl CrawlSession {
    /// Create a session using the bundled sniffer.
    pub fn new(config: CrawlConfig) -> Self {
        let classifier = Classifier::new(&config);
        Self::with_classifier(config, classifier)
    }

    /// Create a session with a preconfigured classifier.
    pub fn with_classifier(config: CrawlConfig, classifier: Classifier) -> Self {
        Self {
            config,
            classifier,
            tracker: IdentityTracker::new(),
            progress: ProgressReporter::new(None),
        }
    }

    /// Publish progress updates on `tx`.
    pub(crate) fn with_progress(mut self, tx: broadcast::Sender<CrawlProgress>) -> Self {
        self.progress = ProgressReporter::new(Some(tx));
        self
    }

    /// Identities claimed so far.
    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    /// Walk the given components and collect their records.
    ///
    /// Components are processed in order (or concurrently when the config
    /// asks for a parallel crawl). The first fatal classification error
    /// aborts the walk and no partial inventory is returned.
    pub fn walk<P>(&self, components: &[P], variant: &str) -> Result<Inventory, CrawlError>
    where
        P: AsRef<Path> + Sync,
    {
        let start = Instant::now();
        let variant = CompactString::from(variant);

        let walks = if self.config.parallel {
            self.walk_parallel(components, &variant)?
        } else {
            components
                .iter()
                .map(|component| self.walk_component(component.as_ref(), &variant))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut inventory = Inventory::new(variant);
        for walk in walks {
            inventory.records.extend(walk.records);
            inventory.stats.merge(&walk.stats);
            inventory.warnings.extend(walk.warnings);
        }
        inventory.stats.components = components.len() as u64;
        inventory.crawl_duration = start.elapsed();

        tracing::info!(
            variant = %inventory.variant,
            records = inventory.len(),
            duplicates = inventory.stats.duplicates_skipped,
            warnings = inventory.warnings.len(),
            elapsed_ms = inventory.crawl_duration.as_millis() as u64,
            "crawl finished"
        );

        Ok(inventory)
    }

    fn walk_parallel<P>(
        &self,
        components: &[P],
        variant: &CompactString,
    ) -> Result<Vec<ComponentWalk>, CrawlError>
    where
        P: AsRef<Path> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| CrawlError::ThreadPool {
                message: e.to_string(),
            })?;

        pool.install(|| {
            components
                .par_iter()
                .map(|component| self.walk_component(component.as_ref(), variant))
                .collect()
        })
    }

    /// Walk one top-level component.
    fn walk_component(
        &self,
        root: &Path,
        variant: &CompactString,
    ) -> Result<ComponentWalk, CrawlError> {
        let component = component_name(root);
        let mut walk = ComponentWalk::default();

        let metadata = match std::fs::symlink_metadata(root) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                walk.vanished(root);
                return Ok(walk);
            }
            Err(err) => return Err(CrawlError::metadata(root, err)),
        };

        if !self.tracker.admit(StorageIdentity::from_metadata(&metadata)) {
            walk.skip(root, SkipReason::Duplicate);
            return Ok(walk);
        }

        self.visit(root, &metadata, &component, variant, &mut walk)?;
        if metadata.is_dir() {
            self.descend(root, &component, variant, &mut walk)?;
        }

        self.progress.component_done(&component);
        Ok(walk)
    }

    /// Visit everything below a component directory.
    fn descend(
        &self,
        root: &Path,
        component: &CompactString,
        variant: &CompactString,
        walk: &mut ComponentWalk,
    ) -> Result<(), CrawlError> {
        let mut entries = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = entries.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    if is_not_found(err.io_error()) {
                        walk.vanished(&path);
                    } else {
                        tracing::warn!(path = %path.display(), error = %err, "cannot list directory");
                        walk.warnings
                            .push(CrawlWarning::unreadable_directory(path, &err));
                    }
                    continue;
                }
            };

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) if is_not_found(err.io_error()) => {
                    walk.vanished(entry.path());
                    continue;
                }
                Err(err) => {
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("metadata unavailable"));
                    return Err(CrawlError::metadata(entry.path(), source));
                }
            };

            if !self.tracker.admit(StorageIdentity::from_metadata(&metadata)) {
                walk.skip(entry.path(), SkipReason::Duplicate);
                if metadata.is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }

            self.visit(entry.path(), &metadata, component, variant, walk)?;
        }

        Ok(())
    }

    /// Classify an admitted entry and emit its record.
    fn visit(
        &self,
        path: &Path,
        metadata: &Metadata,
        component: &CompactString,
        variant: &CompactString,
        walk: &mut ComponentWalk,
    ) -> Result<(), CrawlError> {
        match self.classifier.classify_with_metadata(path, metadata) {
            ClassifyOutcome::Classified(classification) => {
                let size = metadata.len();
                let record = InventoryRecord::new(
                    path.to_string_lossy(),
                    component.clone(),
                    variant.clone(),
                    size,
                    classification,
                );
                walk.stats.record(&record);
                walk.records.push(record);
                self.progress.record(size, component);
                Ok(())
            }
            ClassifyOutcome::Skipped(reason) => {
                walk.skip(path, reason);
                Ok(())
            }
            ClassifyOutcome::Fatal(err) => Err(err),
        }
    }
}

/// Name recorded for a component: its own file name.
fn component_name(root: &Path) -> CompactString {
    root.file_name()
        .map(|name| CompactString::from(name.to_string_lossy()))
        .unwrap_or_else(|| CompactString::from(root.to_string_lossy()))
}

fn is_not_found(err: Option<&std::io::Error>) -> bool {
    err.is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_store() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("abc-hello/bin")).unwrap();
        fs::create_dir_all(root.join("abc-hello/share/doc")).unwrap();
        fs::write(root.join("abc-hello/bin/hello"), "#!/bin/sh\necho hello\n").unwrap();
        fs::write(root.join("abc-hello/share/doc/README"), "hello docs").unwrap();
        fs::write(root.join("def-readme"), "top-level file").unwrap();

        temp
    }

    #[test]
    fn test_walk_order_is_sorted_preorder() {
        let temp = create_store();
        let session = CrawlSession::new(CrawlConfig::default());
        let inventory = session
            .walk(&[temp.path().join("abc-hello")], "base")
            .unwrap();

        let rel: Vec<_> = inventory
            .iter()
            .map(|r| {
                Path::new(&r.name)
                    .strip_prefix(temp.path())
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(
            rel,
            vec![
                "abc-hello",
                "abc-hello/bin",
                "abc-hello/bin/hello",
                "abc-hello/share",
                "abc-hello/share/doc",
                "abc-hello/share/doc/README",
            ]
        );
    }

    #[test]
    fn test_file_component() {
        let temp = create_store();
        let session = CrawlSession::new(CrawlConfig::default());
        let inventory = session.walk(&[temp.path().join("def-readme")], "base").unwrap();

        assert_eq!(inventory.len(), 1);
        let record = &inventory.records[0];
        assert_eq!(record.component, "def-readme");
        assert_eq!(record.size, 14);
        assert_eq!(record.mime_type, "text/plain");
    }

    #[test]
    fn test_missing_component_is_a_warning() {
        let temp = create_store();
        let session = CrawlSession::new(CrawlConfig::default());
        let inventory = session
            .walk(&[temp.path().join("zzz-gone"), temp.path().join("def-readme")], "base")
            .unwrap();

        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.stats.vanished_skipped, 1);
        assert_eq!(inventory.warnings.len(), 1);
        assert_eq!(inventory.stats.components, 2);
    }

    #[test]
    fn test_stats_match_records() {
        let temp = create_store();
        let session = CrawlSession::new(CrawlConfig::default());
        let inventory = session
            .walk(&[temp.path().join("abc-hello"), temp.path().join("def-readme")], "base")
            .unwrap();

        assert_eq!(inventory.stats.total_files, 3);
        assert_eq!(inventory.stats.total_dirs, 4);
        assert_eq!(
            inventory.stats.total_size,
            inventory.iter().map(|r| r.size).sum::<u64>()
        );
        assert_eq!(session.tracker().len(), inventory.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_repeated_component_skipped_with_subtree() {
        let temp = create_store();
        let session = CrawlSession::new(CrawlConfig::default());
        let component = temp.path().join("abc-hello");
        let inventory = session
            .walk(&[component.clone(), component], "base")
            .unwrap();

        assert_eq!(inventory.len(), 6);
        assert_eq!(inventory.stats.duplicates_skipped, 1);
    }
}
