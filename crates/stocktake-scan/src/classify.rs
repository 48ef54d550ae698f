//! Per-entry classification.

use std::fs::{File, FileType, Metadata};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use stocktake_core::{Classification, CrawlConfig, CrawlError, SkipReason, UnsupportedKind};

use crate::sniff::{ContentSniffer, SignatureSniffer};

/// Outcome of classifying one entry.
#[derive(Debug)]
pub enum ClassifyOutcome {
    /// The entry belongs in the inventory.
    Classified(Classification),
    /// The entry is left out without failing the crawl.
    Skipped(SkipReason),
    /// The crawl must abort.
    Fatal(CrawlError),
}

impl ClassifyOutcome {
    /// The classification, if the entry was classified.
    pub fn classification(&self) -> Option<&Classification> {
        match self {
            Self::Classified(classification) => Some(classification),
            _ => None,
        }
    }
}

/// Determines entry kinds and sniffs regular file content.
#[derive(Clone)]
pub struct Classifier {
    config: CrawlConfig,
    sniffer: Arc<dyn ContentSniffer>,
}

impl Classifier {
    /// Create a classifier using the bundled signature sniffer.
    pub fn new(config: &CrawlConfig) -> Self {
        Self::with_sniffer(config, Arc::new(SignatureSniffer::new()))
    }

    /// Create a classifier with a custom sniffer.
    pub fn with_sniffer(config: &CrawlConfig, sniffer: Arc<dyn ContentSniffer>) -> Self {
        Self {
            config: config.clone(),
            sniffer,
        }
    }

    /// Classify the entry at `path` without following symlinks.
    pub fn classify(&self, path: &Path) -> ClassifyOutcome {
        match std::fs::symlink_metadata(path) {
            Ok(metadata) => self.classify_with_metadata(path, &metadata),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                ClassifyOutcome::Skipped(SkipReason::Vanished)
            }
            Err(err) => ClassifyOutcome::Fatal(CrawlError::metadata(path, err)),
        }
    }

    /// Classify an entry whose `lstat` metadata is already known.
    pub fn classify_with_metadata(&self, path: &Path, metadata: &Metadata) -> ClassifyOutcome {
        let file_type = metadata.file_type();

        if file_type.is_symlink() {
            ClassifyOutcome::Classified(Classification::symlink())
        } else if file_type.is_dir() {
            ClassifyOutcome::Classified(Classification::directory())
        } else if file_type.is_file() {
            self.classify_file(path)
        } else {
            ClassifyOutcome::Fatal(CrawlError::UnsupportedEntryKind {
                path: path.to_path_buf(),
                kind: unsupported_kind(&file_type),
            })
        }
    }

    fn classify_file(&self, path: &Path) -> ClassifyOutcome {
        match read_prefix(path, self.config.prefix_len) {
            Ok(prefix) => {
                let sniffed = self.sniffer.sniff(&prefix);
                ClassifyOutcome::Classified(Classification::sniffed(
                    sniffed.mime_type,
                    sniffed.description,
                ))
            }
            Err(err) if self.config.is_lock_file(path) => {
                tracing::debug!(path = %path.display(), error = %err, "skipping unreadable lock file");
                ClassifyOutcome::Skipped(SkipReason::LockFile)
            }
            Err(err) => ClassifyOutcome::Fatal(CrawlError::read(path, err)),
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("prefix_len", &self.config.prefix_len)
            .field("lock_extensions", &self.config.lock_extensions)
            .finish_non_exhaustive()
    }
}

/// Read at most `len` bytes from the start of a file.
fn read_prefix(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut prefix = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut prefix)?;
    Ok(prefix)
}

#[cfg(unix)]
fn unsupported_kind(file_type: &FileType) -> UnsupportedKind {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_block_device() {
        UnsupportedKind::BlockDevice
    } else if file_type.is_char_device() {
        UnsupportedKind::CharDevice
    } else if file_type.is_fifo() {
        UnsupportedKind::Fifo
    } else if file_type.is_socket() {
        UnsupportedKind::Socket
    } else {
        UnsupportedKind::Unknown
    }
}

#[cfg(not(unix))]
fn unsupported_kind(_file_type: &FileType) -> UnsupportedKind {
    UnsupportedKind::Unknown
}
