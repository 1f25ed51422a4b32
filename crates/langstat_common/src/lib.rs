//! Shared foundational types used across the langstat workspace.
//!
//! This crate provides git object identifiers, content fingerprints, and the
//! per-file language statistics that the cache persists and the aggregator
//! updates.

#![warn(missing_docs)]

pub mod hash;
pub mod object_id;
pub mod stats;

pub use hash::ContentHash;
pub use object_id::{ObjectId, ParseObjectIdError};
pub use stats::{FileStat, LanguageStats, LanguageTotals};

/// Identifier of a commit whose tree is being measured.
pub type RevisionId = ObjectId;
