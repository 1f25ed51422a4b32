//! Configuration types deserialized from `langstat.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Default name of the cache file inside the repository's control directory.
pub const DEFAULT_CACHE_FILE: &str = "language-stats.cache";

/// Trees with more tracked files than this are not measured.
pub const DEFAULT_MAX_TREE_SIZE: usize = 100_000;

/// The top-level configuration parsed from `langstat.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LangstatConfig {
    /// Cache file placement and encoding.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Tree walking limits.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Overrides layered on top of the built-in classifier tables.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Log verbosity when neither `RUST_LOG` nor a CLI flag sets one.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the persisted statistics cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// File name of the cache within the repository's control directory.
    #[serde(default = "default_cache_file")]
    pub file_name: String,
    /// zlib compression level, 0 through 9.
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file_name: default_cache_file(),
            compression_level: default_compression_level(),
        }
    }
}

/// Limits applied while walking a tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Maximum number of tracked files before a tree is considered too large.
    #[serde(default = "default_max_tree_size")]
    pub max_tree_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_tree_size: DEFAULT_MAX_TREE_SIZE,
        }
    }
}

/// User-supplied classification overrides.
///
/// These change classifier output, so they are folded into the classifier's
/// version string and invalidate existing caches when edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// File extension (without the dot, case-insensitive) to language name.
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
    /// Exact file name to language name.
    #[serde(default)]
    pub filenames: BTreeMap<String, String>,
    /// Additional vendored path prefixes, e.g. `"external/"`.
    #[serde(default)]
    pub vendored: Vec<String>,
}

impl ClassifierConfig {
    /// Returns `true` if no override is configured.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.filenames.is_empty() && self.vendored.is_empty()
    }
}

/// Logging defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}

fn default_compression_level() -> u32 {
    6
}

fn default_max_tree_size() -> usize {
    DEFAULT_MAX_TREE_SIZE
}

fn default_log_level() -> String {
    "warn".to_string()
}
