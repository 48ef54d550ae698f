//! Resolution of crawl roots into top-level components.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stocktake_core::CrawlError;

/// Where the top-level components of a crawl come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootSpec {
    /// Every immediate child of a directory, sorted by name.
    Directory(PathBuf),
    /// Named components under a parent directory, in the given order.
    Components {
        /// Directory the names are resolved against.
        parent: PathBuf,
        /// Component names; only the final path segment of each is used.
        names: Vec<String>,
    },
}

impl RootSpec {
    /// Crawl every child of `dir`.
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::Directory(dir.into())
    }

    /// Crawl the named components of `parent`.
    pub fn components<I, S>(parent: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Components {
            parent: parent.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a root spec from a component listing, one name per line.
    ///
    /// Surrounding whitespace is trimmed and blank lines are ignored.
    pub fn from_listing(parent: impl Into<PathBuf>, listing: &str) -> Self {
        Self::components(
            parent,
            listing.lines().map(str::trim).filter(|line| !line.is_empty()),
        )
    }

    /// Interpret a command-line root.
    ///
    /// A directory crawls its children. A regular file is read as a listing
    /// whose names are resolved against the listing's own directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| CrawlError::io(path, e))?;

        if metadata.is_dir() {
            Ok(Self::directory(path))
        } else if metadata.is_file() {
            let listing = fs::read_to_string(path).map_err(|e| CrawlError::io(path, e))?;
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            Ok(Self::from_listing(parent, &listing))
        } else {
            Err(CrawlError::InvalidRoot {
                path: path.to_path_buf(),
            })
        }
    }

    /// Resolve into component paths, in crawl order.
    pub fn resolve(&self) -> Result<Vec<PathBuf>, CrawlError> {
        match self {
            Self::Directory(dir) => {
                let entries = fs::read_dir(dir).map_err(|e| CrawlError::io(dir, e))?;
                let mut children = entries
                    .map(|entry| entry.map(|e| e.path()))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| CrawlError::io(dir, e))?;
                children.sort();
                Ok(children)
            }
            Self::Components { parent, names } => names
                .iter()
                .map(|name| {
                    Path::new(name)
                        .file_name()
                        .map(|file_name| parent.join(file_name))
                        .ok_or_else(|| CrawlError::InvalidRoot {
                            path: PathBuf::from(name),
                        })
                })
                .collect(),
        }
    }
}
