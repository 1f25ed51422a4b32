//! [`RevisionStore`] over a libgit2 repository.

use std::path::Path;

use git2::{Delta, Oid, Repository, Tree, TreeWalkMode, TreeWalkResult};
use langstat_common::{ObjectId, RevisionId};

use crate::error::GitError;
use crate::store::{RevisionStore, TreeChange, TreeEntry};

/// Mask selecting the object type bits of a git file mode.
const MODE_TYPE_MASK: i32 = 0o170000;

/// Object type bits of regular (including executable) files.
const MODE_REGULAR: i32 = 0o100000;

/// Revision store backed by a git repository on disk.
pub struct GitStore {
    repo: Repository,
}

impl GitStore {
    /// Opens a work tree, a `.git` directory, or a bare repository.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::open(path).map_err(|source| GitError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %repo.path().display(), bare = repo.is_bare(), "opened repository");
        Ok(Self { repo })
    }

    /// The repository's control directory (`.git`, or the root of a bare repo).
    pub fn cache_dir(&self) -> &Path {
        self.repo.path()
    }

    fn tree(&self, revision: &RevisionId) -> Result<Tree<'_>, GitError> {
        let object_err = |e: git2::Error| GitError::Object {
            id: *revision,
            reason: e.message().to_string(),
        };
        let commit = self
            .repo
            .find_commit(to_oid(revision)?)
            .map_err(object_err)?;
        commit.tree().map_err(object_err)
    }
}

impl RevisionStore for GitStore {
    fn resolve_head(&self) -> Result<RevisionId, GitError> {
        let resolve_err = |e: git2::Error| GitError::Resolve {
            spec: "HEAD".to_string(),
            reason: e.message().to_string(),
        };
        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(resolve_err)?;
        to_object_id(commit.id())
    }

    fn resolve(&self, spec: &str) -> Result<RevisionId, GitError> {
        let commit = self
            .repo
            .revparse_single(spec)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| GitError::Resolve {
                spec: spec.to_string(),
                reason: e.message().to_string(),
            })?;
        to_object_id(commit.id())
    }

    fn contains(&self, revision: &RevisionId) -> bool {
        to_oid(revision)
            .ok()
            .is_some_and(|oid| self.repo.find_commit(oid).is_ok())
    }

    fn list_files(&self, revision: &RevisionId) -> Result<Vec<TreeEntry>, GitError> {
        let tree = self.tree(revision)?;
        let mut entries = Vec::new();
        let mut bad_id = None;

        let walked = tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if !is_regular(entry.filemode()) {
                return TreeWalkResult::Ok;
            }
            match to_object_id(entry.id()) {
                Ok(blob) => {
                    let name = String::from_utf8_lossy(entry.name_bytes());
                    entries.push(TreeEntry {
                        path: format!("{root}{name}"),
                        blob,
                    });
                    TreeWalkResult::Ok
                }
                Err(e) => {
                    bad_id = Some(e);
                    TreeWalkResult::Abort
                }
            }
        });
        if let Some(e) = bad_id {
            return Err(e);
        }
        walked.map_err(|e| GitError::Object {
            id: *revision,
            reason: e.message().to_string(),
        })?;

        // Pre-order walks visit "a/" before "a.txt"; callers expect path order.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn count_files(&self, revision: &RevisionId, limit: usize) -> Result<usize, GitError> {
        let tree = self.tree(revision)?;
        let mut count = 0usize;

        let walked = tree.walk(TreeWalkMode::PreOrder, |_, entry| {
            if is_regular(entry.filemode()) {
                count += 1;
                if count > limit {
                    return TreeWalkResult::Abort;
                }
            }
            TreeWalkResult::Ok
        });
        // `Abort` surfaces as an error from `walk`.
        if count <= limit {
            walked.map_err(|e| GitError::Object {
                id: *revision,
                reason: e.message().to_string(),
            })?;
        }
        Ok(count)
    }

    fn read_blob(&self, blob: &ObjectId) -> Result<Vec<u8>, GitError> {
        let found = self
            .repo
            .find_blob(to_oid(blob)?)
            .map_err(|e| GitError::Object {
                id: *blob,
                reason: e.message().to_string(),
            })?;
        Ok(found.content().to_vec())
    }

    fn blob_size(&self, blob: &ObjectId) -> Result<u64, GitError> {
        let object_err = |e: git2::Error| GitError::Object {
            id: *blob,
            reason: e.message().to_string(),
        };
        let odb = self.repo.odb().map_err(object_err)?;
        let (size, _kind) = odb.read_header(to_oid(blob)?).map_err(object_err)?;
        Ok(size as u64)
    }

    fn diff_trees(
        &self,
        old: &RevisionId,
        new: &RevisionId,
    ) -> Result<Vec<TreeChange>, GitError> {
        let old_tree = self.tree(old)?;
        let new_tree = self.tree(new)?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .map_err(|e| GitError::Diff {
                old: *old,
                new: *new,
                reason: e.message().to_string(),
            })?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let status = delta.status();
            let old_file = delta.old_file();
            let new_file = delta.new_file();

            let old_path = old_file
                .path_bytes()
                .filter(|_| !matches!(status, Delta::Added | Delta::Untracked | Delta::Ignored))
                .filter(|_| is_regular(i32::from(old_file.mode())))
                .map(|p| String::from_utf8_lossy(p).into_owned());
            let new_path = new_file
                .path_bytes()
                .filter(|_| status != Delta::Deleted)
                .filter(|_| is_regular(i32::from(new_file.mode())))
                .map(|p| String::from_utf8_lossy(p).into_owned());

            match (old_path, new_path) {
                (Some(old_path), Some(new_path)) if old_path == new_path => {
                    changes.push(TreeChange::modified(new_path, to_object_id(new_file.id())?));
                }
                (old_path, Some(new_path)) => {
                    if let Some(old_path) = old_path {
                        changes.push(TreeChange::removed(old_path));
                    }
                    changes.push(TreeChange::added(new_path, to_object_id(new_file.id())?));
                }
                (Some(old_path), None) => changes.push(TreeChange::removed(old_path)),
                (None, None) => {}
            }
        }

        tracing::debug!(
            old = %old.short(),
            new = %new.short(),
            changes = changes.len(),
            "diffed trees"
        );
        Ok(changes)
    }
}

fn is_regular(mode: i32) -> bool {
    mode & MODE_TYPE_MASK == MODE_REGULAR
}

fn to_object_id(oid: Oid) -> Result<ObjectId, GitError> {
    ObjectId::from_slice(oid.as_bytes())
        .ok_or_else(|| GitError::UnsupportedObjectId(oid.to_string()))
}

fn to_oid(id: &ObjectId) -> Result<Oid, GitError> {
    Oid::from_bytes(id.as_bytes()).map_err(|e| GitError::Object {
        id: *id,
        reason: e.message().to_string(),
    })
}
