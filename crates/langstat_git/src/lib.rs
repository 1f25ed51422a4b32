//! Read-only access to a repository's commit trees and blobs.
//!
//! The [`RevisionStore`] trait is the narrow surface the aggregator needs:
//! resolve a revision, list its files, read blobs, and diff two trees.
//! [`GitStore`] implements it over libgit2; [`MemoryStore`] keeps everything
//! in memory for tests and for callers without an object database.

#![warn(missing_docs)]

pub mod error;
pub mod git;
pub mod memory;
pub mod store;

pub use error::GitError;
pub use git::GitStore;
pub use memory::MemoryStore;
pub use store::{ChangeKind, RevisionStore, TreeChange, TreeEntry};
