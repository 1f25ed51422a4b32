//! Full and incremental statistics computation.
//!
//! A full scan classifies every file in a revision's tree. An incremental
//! run starts from a seed (the statistics of an earlier revision) and
//! reclassifies only the paths the tree diff reports. Both produce the same
//! [`LanguageStats`] for the same target.

use std::cell::OnceCell;

use langstat_classify::{BlobContent, Classifier, ClassifyError};
use langstat_common::{FileStat, LanguageStats, ObjectId, RevisionId};
use langstat_git::{ChangeKind, RevisionStore};

use crate::error::StatsError;

/// Result of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Per-file classification at the target revision.
    pub stats: LanguageStats,
    /// `false` when the tree was over the size limit and `stats` is a
    /// placeholder that must not be cached.
    pub persistable: bool,
    /// `true` when the result was patched from a seed rather than scanned.
    pub seeded: bool,
}

impl Snapshot {
    fn oversized(seeded: bool) -> Self {
        Self {
            stats: LanguageStats::new(),
            persistable: false,
            seeded,
        }
    }
}

/// Computes statistics for a revision.
pub struct Aggregator<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    classifier: &'a C,
    max_tree_size: usize,
}

impl<'a, S, C> Aggregator<'a, S, C>
where
    S: RevisionStore + ?Sized,
    C: Classifier + ?Sized,
{
    /// Creates an aggregator reading from `store` and classifying with `classifier`.
    ///
    /// Trees with more than `max_tree_size` files are not analysed.
    pub fn new(store: &'a S, classifier: &'a C, max_tree_size: usize) -> Self {
        Self {
            store,
            classifier,
            max_tree_size,
        }
    }

    /// Computes the statistics at `target`.
    ///
    /// With a seed `(revision, stats)` only the paths that differ between
    /// `revision` and `target` are reclassified. A seed whose revision no
    /// longer exists is discarded in favour of a full scan.
    pub fn compute(
        &self,
        target: &RevisionId,
        seed: Option<(RevisionId, LanguageStats)>,
    ) -> Result<Snapshot, StatsError> {
        match seed {
            Some((base, stats)) if self.store.contains(&base) => {
                self.incremental(&base, stats, target)
            }
            Some((base, _)) => {
                tracing::warn!(
                    seed = %base.short(),
                    "cached revision is gone from the repository, rescanning"
                );
                self.full(target)
            }
            None => self.full(target),
        }
    }

    fn full(&self, target: &RevisionId) -> Result<Snapshot, StatsError> {
        let entries = self.store.list_files(target)?;
        tracing::debug!(revision = %target.short(), files = entries.len(), "full scan");

        if entries.len() > self.max_tree_size {
            self.warn_oversized(target, entries.len());
            return Ok(Snapshot::oversized(false));
        }

        let mut stats = LanguageStats::new();
        for entry in &entries {
            if let Some(stat) = self.classify(&entry.path, entry.blob)? {
                stats.insert(entry.path.clone(), stat);
            }
        }
        Ok(Snapshot {
            stats,
            persistable: true,
            seeded: false,
        })
    }

    fn incremental(
        &self,
        base: &RevisionId,
        mut stats: LanguageStats,
        target: &RevisionId,
    ) -> Result<Snapshot, StatsError> {
        let files = self.store.count_files(target, self.max_tree_size)?;
        if files > self.max_tree_size {
            self.warn_oversized(target, files);
            return Ok(Snapshot::oversized(true));
        }

        let changes = if base == target {
            Vec::new()
        } else {
            self.store.diff_trees(base, target)?
        };
        tracing::debug!(
            from = %base.short(),
            to = %target.short(),
            changes = changes.len(),
            "incremental update"
        );

        for change in &changes {
            stats.remove(&change.path);
            let blob = match (change.kind, change.blob) {
                (ChangeKind::Removed, _) | (_, None) => continue,
                (ChangeKind::Added | ChangeKind::Modified, Some(blob)) => blob,
            };
            if let Some(stat) = self.classify(&change.path, blob)? {
                stats.insert(change.path.clone(), stat);
            }
        }
        Ok(Snapshot {
            stats,
            persistable: true,
            seeded: true,
        })
    }

    fn classify(&self, path: &str, blob: ObjectId) -> Result<Option<FileStat>, StatsError> {
        let content = LazyBlob::new(self.store, path, blob)?;
        let classification = self.classifier.classify(path, &content)?;
        Ok(classification
            .language()
            .map(|language| FileStat::new(language, content.size())))
    }

    fn warn_oversized(&self, target: &RevisionId, files: usize) {
        tracing::warn!(
            revision = %target.short(),
            files,
            limit = self.max_tree_size,
            "tree exceeds scan.max_tree_size, reporting no languages"
        );
    }
}

/// Blob content fetched from the store on first access.
struct LazyBlob<'a, S: ?Sized> {
    store: &'a S,
    path: &'a str,
    id: ObjectId,
    size: u64,
    data: OnceCell<Vec<u8>>,
}

impl<'a, S: RevisionStore + ?Sized> LazyBlob<'a, S> {
    fn new(store: &'a S, path: &'a str, id: ObjectId) -> Result<Self, StatsError> {
        Ok(Self {
            store,
            path,
            id,
            size: store.blob_size(&id)?,
            data: OnceCell::new(),
        })
    }
}

impl<S: RevisionStore + ?Sized> BlobContent for LazyBlob<'_, S> {
    fn size(&self) -> u64 {
        self.size
    }

    fn data(&self) -> Result<&[u8], ClassifyError> {
        if let Some(data) = self.data.get() {
            return Ok(data);
        }
        let bytes = self
            .store
            .read_blob(&self.id)
            .map_err(|e| ClassifyError::Content {
                path: self.path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self.data.get_or_init(|| bytes))
    }
}
