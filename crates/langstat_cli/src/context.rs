//! Builds the orchestrator from CLI flags and configuration.

use std::path::{Path, PathBuf};

use langstat_classify::ExtensionClassifier;
use langstat_config::{load_config as load_config_file, load_optional_config, ConfigError, LangstatConfig};
use langstat_git::GitStore;
use langstat_stats::Orchestrator;

use crate::GlobalArgs;

/// The orchestrator type every command runs against.
pub type RepoOrchestrator = Orchestrator<GitStore, ExtensionClassifier>;

/// `./.git` when it exists, otherwise the current directory.
pub fn default_git_dir() -> PathBuf {
    let dot_git = Path::new(".git");
    if dot_git.exists() {
        dot_git.to_path_buf()
    } else {
        PathBuf::from(".")
    }
}

/// Loads `--config`, or `./langstat.toml` when present, or the defaults.
pub fn load_config(global: &GlobalArgs) -> Result<LangstatConfig, ConfigError> {
    match &global.config {
        Some(path) => load_config_file(path),
        None => load_optional_config(Path::new(".")),
    }
}

/// Opens the repository and wires it to its cache.
pub fn open(
    global: &GlobalArgs,
    config: &LangstatConfig,
) -> Result<RepoOrchestrator, Box<dyn std::error::Error>> {
    let store = GitStore::open(&global.git_dir)?;
    let cache_dir = store.cache_dir().to_path_buf();
    let classifier = ExtensionClassifier::with_overrides(&config.classifier);
    Ok(Orchestrator::from_config(store, classifier, cache_dir, config))
}
