//! Cache record types.
//!
//! On disk a record is the three-field tuple `(format_version, revision, stats)`,
//! where a revision of forty zeros marks a frozen record. In memory the
//! frozen case is its own variant so no caller has to compare against the
//! magic id.

use langstat_common::{LanguageStats, ObjectId, RevisionId};
use serde::{Deserialize, Serialize};

/// Version of the record layout. Bump on any change to [`RawCacheRecord`].
pub const SCHEMA_VERSION: u32 = 1;

/// Builds the format version string stored in every record.
///
/// It embeds the classifier's version, so upgrading or reconfiguring the
/// classifier invalidates every existing cache.
pub fn format_version(classifier_version: &str) -> String {
    format!("v{SCHEMA_VERSION}:{classifier_version}")
}

/// A usable cache record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRecord {
    /// Statistics computed at `revision`, valid as a seed for later runs.
    Live {
        /// The commit the statistics describe.
        revision: RevisionId,
        /// Per-file classification at that commit.
        stats: LanguageStats,
    },
    /// Statistics pinned until the cache is cleared.
    Frozen {
        /// The statistics reported for every run while frozen.
        stats: LanguageStats,
    },
}

impl CacheRecord {
    /// The stored statistics.
    pub fn stats(&self) -> &LanguageStats {
        match self {
            CacheRecord::Live { stats, .. } | CacheRecord::Frozen { stats } => stats,
        }
    }

    /// Consumes the record, returning its statistics.
    pub fn into_stats(self) -> LanguageStats {
        match self {
            CacheRecord::Live { stats, .. } | CacheRecord::Frozen { stats } => stats,
        }
    }

    /// The on-disk revision field: the real revision, or zeros when frozen.
    pub(crate) fn disk_revision(&self) -> ObjectId {
        match self {
            CacheRecord::Live { revision, .. } => *revision,
            CacheRecord::Frozen { .. } => ObjectId::ZERO,
        }
    }
}

/// Why a read produced no usable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// No cache file exists.
    NotFound,
    /// The file could not be read or decoded.
    Corrupt,
    /// The record was written under a different format version.
    VersionMismatch,
}

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A record matching the current format version.
    Hit(CacheRecord),
    /// Nothing usable; the caller should do a full scan.
    Miss(MissReason),
}

/// The decoded on-disk tuple, uninterpreted.
///
/// Serializes as a three-element sequence, e.g. in JSON:
/// `["v1:0.1.0", "<40 hex>", {"a.py": {"language": "Python", "size": 50}}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCacheRecord(pub String, pub String, pub LanguageStats);

impl RawCacheRecord {
    /// The format version the record was written under.
    pub fn format_version(&self) -> &str {
        &self.0
    }

    /// The revision field as stored (forty zeros when frozen).
    pub fn revision(&self) -> &str {
        &self.1
    }

    /// The stored statistics.
    pub fn stats(&self) -> &LanguageStats {
        &self.2
    }

    /// Interprets the tuple as a [`CacheRecord`].
    ///
    /// Returns `None` when the revision field is not a valid object id.
    pub fn into_record(self) -> Option<CacheRecord> {
        let revision: ObjectId = self.1.parse().ok()?;
        Some(if revision.is_zero() {
            CacheRecord::Frozen { stats: self.2 }
        } else {
            CacheRecord::Live {
                revision,
                stats: self.2,
            }
        })
    }
}
