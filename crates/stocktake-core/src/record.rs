//! Inventory records and entry classification types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::Display;

/// MIME label used for directories.
pub const DIRECTORY_MIME: &str = "os/directory";
/// MIME label used for symbolic links.
pub const SYMLINK_MIME: &str = "os/symlink";
/// Description used for directories.
pub const DIRECTORY_DESCRIPTION: &str = "Directory";
/// Description used for symbolic links.
pub const SYMLINK_DESCRIPTION: &str = "Symlink";

/// Kind of entry an inventory record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (never followed).
    Symlink,
}

/// Entry kinds the crawler refuses to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum UnsupportedKind {
    #[strum(to_string = "block device")]
    BlockDevice,
    #[strum(to_string = "character device")]
    CharDevice,
    #[strum(to_string = "fifo")]
    Fifo,
    #[strum(to_string = "socket")]
    Socket,
    #[strum(to_string = "unknown entry type")]
    Unknown,
}

/// Result of classifying a single filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Kind of the classified entry.
    pub kind: EntryKind,
    /// Sniffed MIME type, or one of the `os/*` sentinels.
    pub mime_type: CompactString,
    /// Free-text description.
    pub description: String,
}

impl Classification {
    /// Classification of a directory.
    pub fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            mime_type: CompactString::const_new(DIRECTORY_MIME),
            description: DIRECTORY_DESCRIPTION.to_string(),
        }
    }

    /// Classification of a symbolic link.
    pub fn symlink() -> Self {
        Self {
            kind: EntryKind::Symlink,
            mime_type: CompactString::const_new(SYMLINK_MIME),
            description: SYMLINK_DESCRIPTION.to_string(),
        }
    }

    /// Classification of a regular file from sniffed content.
    pub fn sniffed(mime_type: impl Into<CompactString>, description: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File,
            mime_type: mime_type.into(),
            description: description.into(),
        }
    }
}

/// One row of an inventory.
///
/// Serializes to exactly six fields: `name`, `component`, `variant`, `size`,
/// `mimeType` and `fileDescription`. The kind of entry is recoverable from
/// the MIME sentinels through [`InventoryRecord::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Path of the entry.
    pub name: String,
    /// Name of the top-level component this entry belongs to.
    pub component: CompactString,
    /// Label of the crawl run.
    pub variant: CompactString,
    /// Size in bytes as reported by `lstat`.
    pub size: u64,
    /// Sniffed MIME type or `os/directory` / `os/symlink`.
    pub mime_type: CompactString,
    /// Sniffed description or `Directory` / `Symlink`.
    pub file_description: String,
}

impl InventoryRecord {
    /// Build a record from a classification.
    pub fn new(
        name: impl Into<String>,
        component: impl Into<CompactString>,
        variant: impl Into<CompactString>,
        size: u64,
        classification: Classification,
    ) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
            variant: variant.into(),
            size,
            mime_type: classification.mime_type,
            file_description: classification.description,
        }
    }

    /// Kind of entry, derived from the MIME sentinels.
    pub fn kind(&self) -> EntryKind {
        match self.mime_type.as_str() {
            DIRECTORY_MIME => EntryKind::Directory,
            SYMLINK_MIME => EntryKind::Symlink,
            _ => EntryKind::File,
        }
    }

    /// Check if this record describes a regular file.
    pub fn is_file(&self) -> bool {
        self.kind() == EntryKind::File
    }

    /// Check if this record describes a directory.
    pub fn is_dir(&self) -> bool {
        self.kind() == EntryKind::Directory
    }

    /// Check if this record describes a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.kind() == EntryKind::Symlink
    }
}
