//! End-to-end runs against real git repositories built with libgit2.

use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use git2::{Repository, Signature};
use langstat_classify::{BlobContent, Classification, Classifier, ClassifyError, ExtensionClassifier};
use langstat_common::{LanguageStats, RevisionId};
use langstat_config::{ClassifierConfig, DEFAULT_MAX_TREE_SIZE};
use langstat_git::{GitStore, RevisionStore};
use langstat_stats::{Aggregator, Orchestrator, RunMode};

struct Counting {
    inner: ExtensionClassifier,
    calls: Rc<Cell<usize>>,
}

impl Classifier for Counting {
    fn version(&self) -> &str {
        self.inner.version()
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

fn counting() -> (Counting, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let classifier = Counting {
        inner: ExtensionClassifier::new(),
        calls: Rc::clone(&calls),
    };
    (classifier, calls)
}

fn init() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

/// Applies `files` and `removed` to the work tree and index, then commits on
/// top of `HEAD`.
fn commit(repo: &Repository, files: &[(&str, &str)], removed: &[&str]) -> RevisionId {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for path in removed {
        fs::remove_file(workdir.join(path)).unwrap();
        index.remove_path(Path::new(path)).unwrap();
    }
    for (path, content) in files {
        let full = workdir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("langstat", "langstat@example.com").unwrap();
    let parents: Vec<git2::Commit> = repo
        .head()
        .ok()
        .and_then(|h| h.peel_to_commit().ok())
        .into_iter()
        .collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "change", &tree, &parent_refs)
        .unwrap();
    oid.to_string().parse().unwrap()
}

/// Commits a parentless tree holding exactly `files` on `refs/heads/<branch>`.
fn orphan(repo: &Repository, branch: &str, files: &[(&str, &str)]) -> RevisionId {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(*name, blob, 0o100644).unwrap();
    }
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();
    let sig = Signature::now("langstat", "langstat@example.com").unwrap();
    let refname = format!("refs/heads/{branch}");
    let oid = repo
        .commit(Some(&refname), &sig, &sig, "orphan", &tree, &[])
        .unwrap();
    oid.to_string().parse().unwrap()
}

fn full_scan(repo_dir: &Path, target: &RevisionId) -> LanguageStats {
    let store = GitStore::open(repo_dir).unwrap();
    let classifier = ExtensionClassifier::new();
    Aggregator::new(&store, &classifier, DEFAULT_MAX_TREE_SIZE)
        .compute(target, None)
        .unwrap()
        .stats
}

fn orchestrator<C: Classifier>(repo_dir: &Path, classifier: C) -> Orchestrator<GitStore, C> {
    let store = GitStore::open(repo_dir).unwrap();
    let cache = store.cache_dir().join("language-stats.cache");
    Orchestrator::new(store, classifier, cache)
}

fn x(n: usize) -> String {
    "x".repeat(n)
}

#[test]
fn added_file_is_the_only_classification() {
    let (dir, repo) = init();
    commit(&repo, &[("a.py", &x(50)), ("b.go", &x(30))], &[]);

    let (classifier, calls) = counting();
    let first = orchestrator(dir.path(), classifier).run(None, false).unwrap();
    assert_eq!(first.mode, RunMode::Full);
    assert_eq!(calls.get(), 2);

    commit(&repo, &[("c.rb", &x(20))], &[]);
    let (classifier, calls) = counting();
    let second = orchestrator(dir.path(), classifier).run(None, false).unwrap();
    assert_eq!(second.mode, RunMode::Incremental);
    assert_eq!(calls.get(), 1);

    let totals: Vec<(String, u64)> = second
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
            ("Ruby".to_string(), 20),
        ]
    );
}

#[test]
fn repeated_runs_are_idempotent() {
    let (dir, repo) = init();
    commit(&repo, &[("src/lib.rs", &x(12)), ("Makefile", &x(3))], &[]);

    let (classifier, calls) = counting();
    let orch = orchestrator(dir.path(), classifier);
    let first = orch.run(None, false).unwrap();
    let cache_bytes = fs::read(orch.cache().path()).unwrap();

    let second = orch.run(None, false).unwrap();
    assert_eq!(first.stats, second.stats);
    assert_eq!(calls.get(), 2);
    assert_eq!(fs::read(orch.cache().path()).unwrap(), cache_bytes);
}

#[test]
fn incremental_equals_full_after_every_step() {
    let (dir, repo) = init();
    commit(
        &repo,
        &[
            ("app/main.py", &x(40)),
            ("app/util.py", &x(10)),
            ("web/index.ts", &x(25)),
            ("README.md", &x(99)),
        ],
        &[],
    );
    let (classifier, _) = counting();
    let orch = orchestrator(dir.path(), classifier);
    orch.run(None, false).unwrap();

    let steps: Vec<(Vec<(&str, String)>, Vec<&str>)> = vec![
        (vec![("lib/server.go", x(60))], vec![]),
        (vec![("app/main.py", x(45))], vec![]),
        (vec![], vec!["web/index.ts"]),
        (vec![("app/helpers.py", x(10))], vec!["app/util.py"]),
        (vec![("bin/deploy", "#!/bin/bash\necho hi\n".to_string())], vec![]),
    ];

    for (files, removed) in steps {
        let files: Vec<(&str, &str)> = files.iter().map(|(p, c)| (*p, c.as_str())).collect();
        let head = commit(&repo, &files, &removed);

        let outcome = orch.run(None, false).unwrap();
        assert_eq!(outcome.mode, RunMode::Incremental);
        assert_eq!(outcome.revision, Some(head));
        assert_eq!(outcome.stats, full_scan(dir.path(), &head));
    }
}

#[test]
fn unrelated_branch_is_diffed_symmetrically() {
    let (dir, repo) = init();
    commit(&repo, &[("a.py", &x(5)), ("shared.go", &x(7))], &[]);
    let other = orphan(&repo, "other", &[("b.rb", &x(3)), ("shared.go", &x(7))]);

    let (classifier, _) = counting();
    let orch = orchestrator(dir.path(), classifier);
    orch.run(None, false).unwrap();

    let outcome = orch.run(Some("other"), false).unwrap();
    assert_eq!(outcome.mode, RunMode::Incremental);
    assert_eq!(outcome.revision, Some(other));
    assert_eq!(outcome.stats, full_scan(dir.path(), &other));
    assert!(outcome.stats.get("a.py").is_none());
}

#[test]
fn frozen_cache_survives_new_commits() {
    let (dir, repo) = init();
    commit(&repo, &[("a.py", &x(5))], &[]);

    let (classifier, calls) = counting();
    let orch = orchestrator(dir.path(), classifier);
    orch.run(None, false).unwrap();
    orch.freeze().unwrap();

    commit(&repo, &[("b.go", &x(5))], &[]);
    let before = calls.get();
    let outcome = orch.run(None, false).unwrap();
    assert_eq!(outcome.mode, RunMode::Frozen);
    assert!(outcome.stats.is_empty());
    assert_eq!(calls.get(), before);

    orch.clear_cache().unwrap();
    assert_eq!(orch.run(None, false).unwrap().stats.len(), 2);
}

#[test]
fn corrupt_cache_is_a_full_scan() {
    let (dir, repo) = init();
    let head = commit(&repo, &[("a.py", &x(5)), ("b.go", &x(6))], &[]);

    let (classifier, _) = counting();
    let orch = orchestrator(dir.path(), classifier);
    orch.run(None, false).unwrap();

    let bytes = fs::read(orch.cache().path()).unwrap();
    fs::write(orch.cache().path(), &bytes[..bytes.len() / 2]).unwrap();

    let outcome = orch.run(None, false).unwrap();
    assert_eq!(outcome.mode, RunMode::Full);
    assert_eq!(outcome.stats, full_scan(dir.path(), &head));
}

#[test]
fn classifier_overrides_invalidate_cache() {
    let (dir, repo) = init();
    commit(&repo, &[("include/api.h", &x(8))], &[]);

    let stats = orchestrator(dir.path(), ExtensionClassifier::new())
        .run(None, false)
        .unwrap()
        .stats;
    assert_eq!(stats.get("include/api.h").unwrap().language, "C");

    let mut overrides = ClassifierConfig::default();
    overrides.extensions.insert("h".to_string(), "C++".to_string());
    let outcome = orchestrator(dir.path(), ExtensionClassifier::with_overrides(&overrides))
        .run(None, false)
        .unwrap();
    assert_eq!(outcome.mode, RunMode::Full);
    assert_eq!(outcome.stats.get("include/api.h").unwrap().language, "C++");
}

#[test]
fn pruned_seed_revision_is_a_full_scan() {
    let (dir, repo) = init();
    let pruned = commit(&repo, &[("a.py", &x(5))], &[]);

    let (classifier, _) = counting();
    orchestrator(dir.path(), classifier).run(None, false).unwrap();

    let head = commit(&repo, &[("b.go", &x(4))], &[]);
    let hex = pruned.to_string();
    fs::remove_file(repo.path().join("objects").join(&hex[..2]).join(&hex[2..])).unwrap();
    assert!(!GitStore::open(dir.path()).unwrap().contains(&pruned));

    let (classifier, _) = counting();
    let outcome = orchestrator(dir.path(), classifier).run(None, false).unwrap();
    assert_eq!(outcome.mode, RunMode::Full);
    assert_eq!(outcome.stats, full_scan(dir.path(), &head));
}

#[test]
fn symlinks_do_not_count() {
    let (dir, repo) = init();
    commit(&repo, &[("real.py", &x(9))], &[]);

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink("real.py", dir.path().join("link.py")).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("link.py")).unwrap();
        index.write().unwrap();
        commit(&repo, &[], &[]);
    }

    let (classifier, _) = counting();
    let stats = orchestrator(dir.path(), classifier).run(None, false).unwrap().stats;
    assert_eq!(stats.len(), 1);
    assert!(stats.get("link.py").is_none());
}
