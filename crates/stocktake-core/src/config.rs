//! Crawl configuration types.

use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::CrawlError;

/// Default number of bytes read from each regular file for sniffing.
pub const DEFAULT_PREFIX_LEN: usize = 2048;

/// Configuration for crawl operations.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CrawlConfig {
    /// Maximum number of bytes read from a regular file for sniffing.
    #[builder(default = "DEFAULT_PREFIX_LEN")]
    #[serde(default = "default_prefix_len")]
    pub prefix_len: usize,

    /// File extensions (without the dot) marking lock files, whose read
    /// failures are skipped instead of aborting the crawl.
    #[builder(default = "default_lock_extensions()")]
    #[serde(default = "default_lock_extensions")]
    pub lock_extensions: Vec<String>,

    /// Crawl top-level components concurrently.
    #[builder(default = "false")]
    #[serde(default)]
    pub parallel: bool,

    /// Number of threads for a parallel crawl (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_prefix_len() -> usize {
    DEFAULT_PREFIX_LEN
}

fn default_lock_extensions() -> Vec<String> {
    vec!["lock".to_string()]
}

impl CrawlConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.prefix_len == Some(0) {
            return Err("Prefix length must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl CrawlConfig {
    /// Create a new crawl config builder.
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::default()
    }

    /// Check a config that was not produced by the builder (e.g. deserialized).
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.prefix_len == 0 {
            return Err(CrawlError::InvalidConfig {
                message: "Prefix length must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Check if a path carries one of the lock-file extensions.
    pub fn is_lock_file(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.lock_extensions
            .iter()
            .any(|lock| lock.trim_start_matches('.') == ext)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            prefix_len: DEFAULT_PREFIX_LEN,
            lock_extensions: default_lock_extensions(),
            parallel: false,
            threads: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = CrawlConfig::builder()
            .prefix_len(512usize)
            .parallel(true)
            .threads(4usize)
            .build()
            .unwrap();

        assert_eq!(config.prefix_len, 512);
        assert!(config.parallel);
        assert_eq!(config.threads, 4);
        assert_eq!(config.lock_extensions, vec!["lock".to_string()]);
    }

    #[test]
    fn test_builder_rejects_zero_prefix() {
        assert!(CrawlConfig::builder().prefix_len(0usize).build().is_err());
    }

    #[test]
    fn test_is_lock_file() {
        let config = CrawlConfig::default();
        assert!(config.is_lock_file(Path::new("/store/c/x.lock")));
        assert!(!config.is_lock_file(Path::new("/store/c/x.txt")));
        assert!(!config.is_lock_file(Path::new("/store/c/lock")));
        assert!(!config.is_lock_file(Path::new("/store/c/x.lock.bak")));
    }

    #[test]
    fn test_lock_extensions_accept_leading_dot() {
        let config = CrawlConfig::builder()
            .lock_extensions(vec![".pid".to_string()])
            .build()
            .unwrap();
        assert!(config.is_lock_file(Path::new("/run/daemon.pid")));
        assert!(!config.is_lock_file(Path::new("/run/daemon.lock")));
    }

    #[test]
    fn test_validate_deserialized_config() {
        let mut config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        config.prefix_len = 0;
        assert!(matches!(
            config.validate(),
            Err(CrawlError::InvalidConfig { .. })
        ));
    }
}
