//! An in-memory [`RevisionStore`].
//!
//! Commits are flat `path -> blob` maps. Blob ids are derived from content,
//! so committing the same bytes twice yields the same id, just as in git.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use langstat_common::{ContentHash, ObjectId, RevisionId};

use crate::error::GitError;
use crate::store::{RevisionStore, TreeChange, TreeEntry};

/// Marker byte distinguishing synthetic commit ids from blob ids.
const COMMIT_MARKER: u8 = 0xc0;

/// Marker byte for synthetic blob ids.
const BLOB_MARKER: u8 = 0xb0;

/// Revision store holding commits and blobs in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    commits: HashMap<RevisionId, BTreeMap<String, ObjectId>>,
    blobs: HashMap<ObjectId, Vec<u8>>,
    refs: HashMap<String, RevisionId>,
    head: Option<RevisionId>,
    next_commit: u64,
    blob_reads: Cell<usize>,
}

impl MemoryStore {
    /// Creates a store with no commits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a commit whose tree is exactly `files`, and moves `HEAD` to it.
    pub fn commit<D: AsRef<[u8]>>(&mut self, files: &[(&str, D)]) -> RevisionId {
        let tree = files
            .iter()
            .map(|(path, data)| (path.to_string(), self.add_blob(data.as_ref())))
            .collect();
        self.commit_tree(tree)
    }

    /// Records a commit derived from the current `HEAD` tree.
    ///
    /// `changes` are written over the parent tree and `removed` paths are
    /// dropped from it.
    pub fn commit_changes<D: AsRef<[u8]>>(
        &mut self,
        changes: &[(&str, D)],
        removed: &[&str],
    ) -> RevisionId {
        let mut tree = self
            .head
            .and_then(|head| self.commits.get(&head).cloned())
            .unwrap_or_default();
        for path in removed {
            tree.remove(*path);
        }
        for (path, data) in changes {
            let blob = self.add_blob(data.as_ref());
            tree.insert(path.to_string(), blob);
        }
        self.commit_tree(tree)
    }

    /// Points a named ref (branch or tag) at a commit.
    pub fn set_ref(&mut self, name: &str, revision: RevisionId) {
        self.refs.insert(name.to_string(), revision);
    }

    /// Moves `HEAD` to a commit.
    pub fn checkout(&mut self, revision: RevisionId) {
        self.head = Some(revision);
    }

    /// Forgets a commit, as if it had been garbage collected.
    pub fn drop_commit(&mut self, revision: &RevisionId) {
        self.commits.remove(revision);
    }

    /// Number of [`RevisionStore::read_blob`] calls served so far.
    pub fn blob_reads(&self) -> usize {
        self.blob_reads.get()
    }

    fn add_blob(&mut self, data: &[u8]) -> ObjectId {
        let hash = ContentHash::from_bytes(data);
        let mut raw = [0u8; 20];
        raw[0] = BLOB_MARKER;
        raw[4..].copy_from_slice(hash.as_bytes());
        let id = ObjectId::from_raw(raw);
        self.blobs.entry(id).or_insert_with(|| data.to_vec());
        id
    }

    fn commit_tree(&mut self, tree: BTreeMap<String, ObjectId>) -> RevisionId {
        self.next_commit += 1;
        let mut raw = [0u8; 20];
        raw[0] = COMMIT_MARKER;
        raw[12..].copy_from_slice(&self.next_commit.to_be_bytes());
        let id = ObjectId::from_raw(raw);
        self.commits.insert(id, tree);
        self.head = Some(id);
        id
    }

    fn tree(&self, revision: &RevisionId) -> Result<&BTreeMap<String, ObjectId>, GitError> {
        self.commits.get(revision).ok_or_else(|| GitError::Object {
            id: *revision,
            reason: "no such commit".to_string(),
        })
    }
}

impl RevisionStore for MemoryStore {
    fn resolve_head(&self) -> Result<RevisionId, GitError> {
        self.head.ok_or_else(|| GitError::Resolve {
            spec: "HEAD".to_string(),
            reason: "HEAD has no commits".to_string(),
        })
    }

    fn resolve(&self, spec: &str) -> Result<RevisionId, GitError> {
        if spec == "HEAD" {
            return self.resolve_head();
        }
        if let Some(id) = self.refs.get(spec) {
            return Ok(*id);
        }
        match spec.parse::<ObjectId>() {
            Ok(id) if self.commits.contains_key(&id) => Ok(id),
            _ => Err(GitError::Resolve {
                spec: spec.to_string(),
                reason: "unknown revision".to_string(),
            }),
        }
    }

    fn contains(&self, revision: &RevisionId) -> bool {
        self.commits.contains_key(revision)
    }

    fn list_files(&self, revision: &RevisionId) -> Result<Vec<TreeEntry>, GitError> {
        Ok(self
            .tree(revision)?
            .iter()
            .map(|(path, blob)| TreeEntry {
                path: path.clone(),
                blob: *blob,
            })
            .collect())
    }

    fn read_blob(&self, blob: &ObjectId) -> Result<Vec<u8>, GitError> {
        self.blob_reads.set(self.blob_reads.get() + 1);
        self.blobs.get(blob).cloned().ok_or_else(|| GitError::Object {
            id: *blob,
            reason: "no such blob".to_string(),
        })
    }

    fn blob_size(&self, blob: &ObjectId) -> Result<u64, GitError> {
        self.blobs
            .get(blob)
            .map(|data| data.len() as u64)
            .ok_or_else(|| GitError::Object {
                id: *blob,
                reason: "no such blob".to_string(),
            })
    }

    fn diff_trees(
        &self,
        old: &RevisionId,
        new: &RevisionId,
    ) -> Result<Vec<TreeChange>, GitError> {
        let old_tree = self.tree(old)?;
        let new_tree = self.tree(new)?;

        let mut changes = Vec::new();
        for (path, blob) in old_tree {
            match new_tree.get(path) {
                None => changes.push(TreeChange::removed(path.clone())),
                Some(new_blob) if new_blob != blob => {
                    changes.push(TreeChange::modified(path.clone(), *new_blob));
                }
                Some(_) => {}
            }
        }
        for (path, blob) in new_tree {
            if !old_tree.contains_key(path) {
                changes.push(TreeChange::added(path.clone(), *blob));
            }
        }
        changes.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(changes)
    }
}
