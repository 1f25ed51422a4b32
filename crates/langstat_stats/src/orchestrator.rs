//! Cache-aware statistics runs.
//!
//! One [`Orchestrator::run`] reads the cache, picks a strategy, and writes
//! the new record back:
//!
//! | cache state | `force` | strategy            | writes cache |
//! |-------------|---------|---------------------|--------------|
//! | frozen      | no      | return stored stats | no           |
//! | live        | no      | incremental         | yes          |
//! | miss        | any     | full scan           | yes          |
//! | any         | yes     | full scan           | yes          |

use std::path::PathBuf;

use langstat_cache::{format_version, CacheLookup, CacheRecord, CacheStore, RawCacheRecord};
use langstat_classify::Classifier;
use langstat_common::{LanguageStats, RevisionId};
use langstat_config::{LangstatConfig, DEFAULT_MAX_TREE_SIZE};
use langstat_git::RevisionStore;

use crate::aggregate::Aggregator;
use crate::error::StatsError;

/// How a run produced its statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// The cache is frozen; nothing was computed.
    Frozen,
    /// The cached statistics were patched with a tree diff.
    Incremental,
    /// Every file at the target was classified.
    Full,
}

/// The result of [`Orchestrator::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Per-file statistics.
    pub stats: LanguageStats,
    /// Which strategy ran.
    pub mode: RunMode,
    /// The resolved target, or `None` when the cache was frozen.
    pub revision: Option<RevisionId>,
}

/// Computes statistics for one repository, backed by its cache file.
pub struct Orchestrator<S, C> {
    store: S,
    classifier: C,
    cache: CacheStore,
    max_tree_size: usize,
}

impl<S: RevisionStore, C: Classifier> Orchestrator<S, C> {
    /// Creates an orchestrator caching at `cache_path` with default settings.
    ///
    /// The cache's format version is derived from the classifier's version.
    pub fn new(store: S, classifier: C, cache_path: impl Into<PathBuf>) -> Self {
        let cache = CacheStore::new(cache_path, format_version(classifier.version()));
        Self {
            store,
            classifier,
            cache,
            max_tree_size: DEFAULT_MAX_TREE_SIZE,
        }
    }

    /// Creates an orchestrator whose cache file lives in `cache_dir`, with
    /// file name, compression, and tree limit taken from `config`.
    pub fn from_config(
        store: S,
        classifier: C,
        cache_dir: impl Into<PathBuf>,
        config: &LangstatConfig,
    ) -> Self {
        let path = cache_dir.into().join(&config.cache.file_name);
        let mut orchestrator = Self::new(store, classifier, path)
            .with_max_tree_size(config.scan.max_tree_size);
        orchestrator.cache = orchestrator
            .cache
            .with_compression(config.cache.compression_level);
        orchestrator
    }

    /// Overrides the tree-size limit.
    pub fn with_max_tree_size(mut self, max_tree_size: usize) -> Self {
        self.max_tree_size = max_tree_size;
        self
    }

    /// The cache backing this orchestrator.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Computes statistics at `target` (a revision expression), or at `HEAD`.
    ///
    /// Unless `force` is set, a frozen cache short-circuits the run and a
    /// live one seeds an incremental update. The result is written back to
    /// the cache unless the tree was too large to analyse.
    pub fn run(&self, target: Option<&str>, force: bool) -> Result<RunOutcome, StatsError> {
        let seed = if force {
            tracing::debug!("forced full scan, ignoring cache");
            None
        } else {
            match self.cache.read() {
                CacheLookup::Hit(CacheRecord::Frozen { stats }) => {
                    tracing::debug!("statistics cache is frozen");
                    return Ok(RunOutcome {
                        stats,
                        mode: RunMode::Frozen,
                        revision: None,
                    });
                }
                CacheLookup::Hit(CacheRecord::Live { revision, stats }) => {
                    tracing::debug!(seed = %revision.short(), files = stats.len(), "cache hit");
                    Some((revision, stats))
                }
                CacheLookup::Miss(reason) => {
                    tracing::debug!(?reason, "cache miss");
                    None
                }
            }
        };

        let revision = match target {
            Some(spec) => self.store.resolve(spec)?,
            None => self.store.resolve_head()?,
        };

        let snapshot = Aggregator::new(&self.store, &self.classifier, self.max_tree_size)
            .compute(&revision, seed)?;
        let mode = if snapshot.seeded {
            RunMode::Incremental
        } else {
            RunMode::Full
        };

        if !snapshot.persistable {
            return Ok(RunOutcome {
                stats: snapshot.stats,
                mode,
                revision: Some(revision),
            });
        }

        let record = CacheRecord::Live {
            revision,
            stats: snapshot.stats,
        };
        self.cache.write(&record)?;
        Ok(RunOutcome {
            stats: record.into_stats(),
            mode,
            revision: Some(revision),
        })
    }

    /// The cache record as stored, without version checks.
    pub fn dump_raw_cache(&self) -> Option<RawCacheRecord> {
        self.cache.read_raw()
    }

    /// Deletes the cache, so the next run is a full scan.
    pub fn clear_cache(&self) -> Result<(), StatsError> {
        self.cache.delete()?;
        tracing::debug!(path = %self.cache.path().display(), "cleared statistics cache");
        Ok(())
    }

    /// Pins empty statistics until the cache is cleared.
    pub fn freeze(&self) -> Result<(), StatsError> {
        self.cache.write(&CacheRecord::Frozen {
            stats: LanguageStats::new(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langstat_classify::{BlobContent, Classification, ClassifyError, ExtensionClassifier};
    use langstat_common::FileStat;
    use langstat_git::MemoryStore;
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    /// Wraps the built-in classifier, counting calls through a shared cell.
    struct Counting {
        inner: ExtensionClassifier,
        version: String,
        calls: Rc<Cell<usize>>,
    }

    impl Counting {
        fn new(version: &str) -> (Self, Rc<Cell<usize>>) {
            let calls = Rc::new(Cell::new(0));
            let classifier = Self {
                inner: ExtensionClassifier::new(),
                version: version.to_string(),
                calls: Rc::clone(&calls),
            };
            (classifier, calls)
        }
    }

    impl Classifier for Counting {
        fn version(&self) -> &str {
            &self.version
        }

        fn classify(
            &self,
            path: &str,
            blob: &dyn BlobContent,
        ) -> Result<Classification, ClassifyError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.classify(path, blob)
        }
    }

    fn bytes(size: usize) -> String {
        "x".repeat(size)
    }

    fn cache_path(dir: &Path) -> PathBuf {
        dir.join("language-stats.cache")
    }

    /// `a.py` (50 bytes) and `b.go` (30 bytes) at HEAD.
    fn two_file_repo() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.commit(&[("a.py", bytes(50)), ("b.go", bytes(30))]);
        store
    }

    #[test]
    fn first_run_is_full_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, calls) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()));

        let outcome = orch.run(None, false).unwrap();
        assert_eq!(outcome.mode, RunMode::Full);
        assert_eq!(calls.get(), 2);
        assert_eq!(outcome.stats.totals().get("Python"), Some(50));

        let raw = orch.dump_raw_cache().unwrap();
        assert_eq!(raw.format_version(), "v1:1");
        assert_eq!(raw.revision(), outcome.revision.unwrap().to_string());
    }

    #[test]
    fn second_run_is_incremental_with_no_classification() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, calls) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()));

        let first = orch.run(None, false).unwrap();
        let second = orch.run(None, false).unwrap();
        assert_eq!(second.mode, RunMode::Incremental);
        assert_eq!(second.stats, first.stats);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn new_commit_classifies_only_the_added_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());

        let mut store = two_file_repo();
        let (classifier, calls) = Counting::new("1");
        Orchestrator::new(&store, classifier, &path)
            .run(None, false)
            .unwrap();
        assert_eq!(calls.get(), 2);

        store.commit_changes(&[("c.rb", bytes(20))], &[]);
        let (classifier, calls) = Counting::new("1");
        let outcome = Orchestrator::new(store, classifier, &path).run(None, false).unwrap();

        assert_eq!(outcome.mode, RunMode::Incremental);
        assert_eq!(calls.get(), 1);
        let totals: Vec<_> = outcome
            .stats
            .totals()
            .iter()
            .map(|(lang, size)| (lang.to_string(), size))
            .collect();
        assert_eq!(
            totals,
            vec![
                ("Python".to_string(), 50),
                ("Go".to_string(), 30),
                ("Ruby".to_string(), 20)
            ]
        );
    }

    #[test]
    fn force_ignores_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, calls) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()));

        orch.run(None, false).unwrap();
        let forced = orch.run(None, true).unwrap();
        assert_eq!(forced.mode, RunMode::Full);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn frozen_cache_skips_the_repository() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, calls) = Counting::new("1");
        // No commits at all: resolving HEAD would fail.
        let orch = Orchestrator::new(MemoryStore::new(), classifier, cache_path(dir.path()));

        orch.freeze().unwrap();
        let outcome = orch.run(None, false).unwrap();
        assert_eq!(outcome.mode, RunMode::Frozen);
        assert!(outcome.stats.is_empty());
        assert_eq!(outcome.revision, None);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn freeze_is_sticky_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()));

        orch.run(None, false).unwrap();
        orch.freeze().unwrap();
        for _ in 0..2 {
            assert_eq!(orch.run(None, false).unwrap().mode, RunMode::Frozen);
        }
        assert_eq!(orch.dump_raw_cache().unwrap().revision(), "0".repeat(40));
    }

    #[test]
    fn clear_returns_to_full_scan() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()));

        orch.freeze().unwrap();
        orch.clear_cache().unwrap();
        assert!(orch.dump_raw_cache().is_none());
        assert_eq!(orch.run(None, false).unwrap().mode, RunMode::Full);
        orch.clear_cache().unwrap();
        orch.clear_cache().unwrap();
    }

    #[test]
    fn classifier_version_change_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());

        let (classifier, _) = Counting::new("1");
        Orchestrator::new(two_file_repo(), classifier, &path)
            .run(None, false)
            .unwrap();

        let (classifier, calls) = Counting::new("2");
        let outcome = Orchestrator::new(two_file_repo(), classifier, &path)
            .run(None, false)
            .unwrap();
        assert_eq!(outcome.mode, RunMode::Full);
        assert_eq!(calls.get(), 2);
        assert_eq!(
            Orchestrator::new(MemoryStore::new(), Counting::new("2").0, &path)
                .dump_raw_cache()
                .unwrap()
                .format_version(),
            "v1:2"
        );
    }

    #[test]
    fn corrupt_cache_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());
        std::fs::write(&path, b"\x00\x01garbage").unwrap();

        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, &path);
        assert_eq!(orch.run(None, false).unwrap().mode, RunMode::Full);
        assert_eq!(orch.run(None, false).unwrap().mode, RunMode::Incremental);
    }

    #[test]
    fn explicit_target_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        let old = store.commit(&[("a.py", bytes(5))]);
        store.set_ref("release", old);
        store.commit(&[("a.py", bytes(5)), ("b.go", bytes(7))]);

        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::new(store, classifier, cache_path(dir.path()));
        let outcome = orch.run(Some("release"), false).unwrap();
        assert_eq!(outcome.revision, Some(old));
        assert_eq!(outcome.stats.len(), 1);
    }

    #[test]
    fn unresolvable_target_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()));

        let err = orch.run(Some("no-such-branch"), false).unwrap_err();
        assert!(matches!(err, StatsError::Git(_)));
        assert!(!orch.cache().path().exists());
    }

    #[test]
    fn checking_out_an_older_commit_reverts_the_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());

        let mut store = two_file_repo();
        let first = store.resolve_head().unwrap();
        store.commit_changes(&[("c.rb", bytes(20))], &["b.go"]);
        let (classifier, _) = Counting::new("1");
        Orchestrator::new(&store, classifier, &path)
            .run(None, false)
            .unwrap();

        store.checkout(first);
        let (classifier, calls) = Counting::new("1");
        let outcome = Orchestrator::new(&store, classifier, &path)
            .run(None, false)
            .unwrap();

        assert_eq!(outcome.mode, RunMode::Incremental);
        assert_eq!(outcome.revision, Some(first));
        assert_eq!(calls.get(), 1);
        assert_eq!(outcome.stats.totals().get("Go"), Some(30));
        assert_eq!(outcome.stats.totals().get("Ruby"), None);
    }

    #[test]
    fn oversized_tree_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()))
            .with_max_tree_size(1);

        let outcome = orch.run(None, false).unwrap();
        assert!(outcome.stats.is_empty());
        assert!(!orch.cache().path().exists());
    }

    #[test]
    fn from_config_applies_file_name_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LangstatConfig::default();
        config.cache.file_name = "custom.cache".to_string();
        config.scan.max_tree_size = 1;

        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::from_config(two_file_repo(), classifier, dir.path(), &config);
        assert_eq!(orch.cache().path(), dir.path().join("custom.cache"));
        assert!(orch.run(None, false).unwrap().stats.is_empty());
    }

    #[test]
    fn stats_match_extension_table() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier, _) = Counting::new("1");
        let orch = Orchestrator::new(two_file_repo(), classifier, cache_path(dir.path()));
        let outcome = orch.run(None, false).unwrap();
        assert_eq!(outcome.stats.get("b.go"), Some(&FileStat::new("Go", 30)));
    }
}
