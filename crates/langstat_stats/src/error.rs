//! Errors from computing statistics.

use langstat_cache::CacheError;
use langstat_classify::ClassifyError;
use langstat_git::GitError;

/// Any failure that aborts a statistics run.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The repository could not be read.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A file could not be classified.
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// The cache could not be written or removed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
