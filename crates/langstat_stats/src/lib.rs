//! Incremental language statistics for a git repository.
//!
//! [`Aggregator`] turns a revision into per-file [`LanguageStats`], either
//! from scratch or by patching a previous result with a tree diff.
//! [`Orchestrator`] wires it to the on-disk cache: it seeds the aggregator
//! from the last run, honours frozen records, and persists the new result.
//!
//! [`LanguageStats`]: langstat_common::LanguageStats

#![warn(missing_docs)]

pub mod aggregate;
pub mod error;
pub mod orchestrator;

pub use aggregate::{Aggregator, Snapshot};
pub use error::StatsError;
pub use orchestrator::{Orchestrator, RunMode, RunOutcome};
