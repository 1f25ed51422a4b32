//! The revision store interface consumed by the aggregator.

use langstat_common::{ObjectId, RevisionId};

use crate::error::GitError;

/// A regular file present in a revision's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repository-relative path with `/` separators.
    pub path: String,
    /// Id of the file's blob.
    pub blob: ObjectId,
}

/// How a path differs between two trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Present only in the newer tree.
    Added,
    /// Present only in the older tree.
    Removed,
    /// Present in both with different content or mode.
    Modified,
}

/// One path-level difference between two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    /// Repository-relative path with `/` separators.
    pub path: String,
    /// Kind of change.
    pub kind: ChangeKind,
    /// Blob in the newer tree; `None` for removals.
    pub blob: Option<ObjectId>,
}

impl TreeChange {
    /// A path that appeared.
    pub fn added(path: impl Into<String>, blob: ObjectId) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Added,
            blob: Some(blob),
        }
    }

    /// A path that disappeared.
    pub fn removed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Removed,
            blob: None,
        }
    }

    /// A path whose blob changed.
    pub fn modified(path: impl Into<String>, blob: ObjectId) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Modified,
            blob: Some(blob),
        }
    }
}

/// Read-only access to commits, trees, and blobs.
///
/// Only regular and executable files are ever reported; symlinks, submodules,
/// and directories are invisible through this interface.
///
/// Paths are `String`s. Git stores path names as raw bytes, so a name that
/// is not valid UTF-8 is decoded lossily; two such names that differ only in
/// their invalid bytes map to the same path and are counted as one file.
pub trait RevisionStore {
    /// Resolves the commit `HEAD` points at.
    fn resolve_head(&self) -> Result<RevisionId, GitError>;

    /// Resolves a revision expression (full id, branch, tag, ...) to a commit.
    fn resolve(&self, spec: &str) -> Result<RevisionId, GitError>;

    /// Returns `true` if the commit still exists in the object database.
    fn contains(&self, revision: &RevisionId) -> bool;

    /// Lists every regular file in the revision's tree, sorted by path.
    fn list_files(&self, revision: &RevisionId) -> Result<Vec<TreeEntry>, GitError>;

    /// Counts the regular files in the revision's tree, stopping early once
    /// the count exceeds `limit`.
    ///
    /// The result is exact when it is `<= limit`, and some value `> limit`
    /// otherwise.
    fn count_files(&self, revision: &RevisionId, _limit: usize) -> Result<usize, GitError> {
        Ok(self.list_files(revision)?.len())
    }

    /// Reads a blob's full content.
    fn read_blob(&self, blob: &ObjectId) -> Result<Vec<u8>, GitError>;

    /// Returns a blob's size without reading its content.
    fn blob_size(&self, blob: &ObjectId) -> Result<u64, GitError>;

    /// Compares two trees path by path.
    ///
    /// The comparison is symmetric and does not require `old` to be an
    /// ancestor of `new`. Renames are reported as a removal plus an addition.
    fn diff_trees(&self, old: &RevisionId, new: &RevisionId)
        -> Result<Vec<TreeChange>, GitError>;
}

impl<S: RevisionStore + ?Sized> RevisionStore for &S {
    fn resolve_head(&self) -> Result<RevisionId, GitError> {
        (**self).resolve_head()
    }

    fn resolve(&self, spec: &str) -> Result<RevisionId, GitError> {
        (**self).resolve(spec)
    }

    fn contains(&self, revision: &RevisionId) -> bool {
        (**self).contains(revision)
    }

    fn list_files(&self, revision: &RevisionId) -> Result<Vec<TreeEntry>, GitError> {
        (**self).list_files(revision)
    }

    fn count_files(&self, revision: &RevisionId, limit: usize) -> Result<usize, GitError> {
        (**self).count_files(revision, limit)
    }

    fn read_blob(&self, blob: &ObjectId) -> Result<Vec<u8>, GitError> {
        (**self).read_blob(blob)
    }

    fn blob_size(&self, blob: &ObjectId) -> Result<u64, GitError> {
        (**self).blob_size(blob)
    }

    fn diff_trees(
        &self,
        old: &RevisionId,
        new: &RevisionId,
    ) -> Result<Vec<TreeChange>, GitError> {
        (**self).diff_trees(old, new)
    }
}
