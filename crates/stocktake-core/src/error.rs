//! Error types for crawl operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::record::UnsupportedKind;

/// Errors that abort a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A regular file could not be read and is not a lock file.
    #[error("Read error at {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Entry is neither a file, a directory nor a symlink.
    #[error("Unsupported entry kind ({kind}) at {path}")]
    UnsupportedEntryKind { path: PathBuf, kind: UnsupportedKind },

    /// Metadata could not be read for a reason other than the entry vanishing.
    #[error("Metadata error at {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while resolving crawl roots.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root is neither a directory nor a component listing.
    #[error("Invalid crawl root: {path}")]
    InvalidRoot { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Worker pool for a parallel crawl could not be built.
    #[error("Failed to build crawl thread pool: {message}")]
    ThreadPool { message: String },
}

impl CrawlError {
    /// Create a read error with path context.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a metadata error with path context.
    pub fn metadata(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Metadata {
            path: path.into(),
            source,
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ReadError { path, .. }
            | Self::UnsupportedEntryKind { path, .. }
            | Self::Metadata { path, .. }
            | Self::Io { path, .. }
            | Self::InvalidRoot { path } => Some(path),
            Self::InvalidConfig { .. } | Self::ThreadPool { .. } => None,
        }
    }
}

/// Why an entry was left out of the inventory without failing the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Storage identity was already recorded in this crawl.
    Duplicate,
    /// Unreadable lock file.
    LockFile,
    /// Entry disappeared between listing and inspection.
    Vanished,
}

/// Kind of crawl warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A directory could not be listed; its contents are missing.
    UnreadableDirectory,
    /// An entry disappeared during the walk.
    Vanished,
}

/// Non-fatal anomaly encountered during a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl CrawlWarning {
    /// Create a new crawl warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for an entry that vanished mid-walk.
    pub fn vanished(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Vanished during crawl: {}", path.display()),
            path,
            kind: WarningKind::Vanished,
        }
    }

    /// Create a warning for a directory whose listing failed.
    pub fn unreadable_directory(path: impl Into<PathBuf>, error: &dyn std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: format!("Cannot list directory: {error}"),
            kind: WarningKind::UnreadableDirectory,
        }
    }
}
