//! Persistent statistics cache.
//!
//! One compressed record per repository remembers the statistics computed at
//! a revision, so the next run only classifies the files that changed since.
//! All reads are fail-safe: corruption or version mismatches result in cache
//! misses rather than errors. Writes are atomic.

#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod store;

pub use error::CacheError;
pub use record::{format_version, CacheLookup, CacheRecord, MissReason, RawCacheRecord, SCHEMA_VERSION};
pub use store::CacheStore;
