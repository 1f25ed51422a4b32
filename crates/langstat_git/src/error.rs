//! Error types for revision store access.

use std::path::PathBuf;

use langstat_common::ObjectId;

/// Errors raised while reading the object database.
///
/// All of them are fatal for the current invocation: the statistics cannot
/// be computed without the trees and blobs they describe.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The path does not point at a readable repository.
    #[error("failed to open repository at {path}: {source}")]
    Open {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying libgit2 error.
        source: git2::Error,
    },

    /// A revision expression did not resolve to a commit.
    #[error("cannot resolve revision '{spec}': {reason}")]
    Resolve {
        /// The revision expression as given.
        spec: String,
        /// Description of the failure.
        reason: String,
    },

    /// An object could not be found or read.
    #[error("cannot read object {id}: {reason}")]
    Object {
        /// The object that failed.
        id: ObjectId,
        /// Description of the failure.
        reason: String,
    },

    /// Two trees could not be compared.
    #[error("cannot diff {old}..{new}: {reason}")]
    Diff {
        /// The older revision.
        old: ObjectId,
        /// The newer revision.
        new: ObjectId,
        /// Description of the failure.
        reason: String,
    },

    /// The backend produced an object id that is not 20 bytes long.
    #[error("unsupported object id '{0}': only SHA-1 repositories are supported")]
    UnsupportedObjectId(String),
}
