//! Subcommand handlers.
//!
//! Each handler writes its JSON document (if any) followed by a newline and
//! returns the process exit code.

use std::io::Write;

use langstat_classify::Classifier;
use langstat_git::RevisionStore;
use langstat_stats::Orchestrator;

use crate::GlobalArgs;

type CommandResult = Result<i32, Box<dyn std::error::Error>>;

/// `langstat stats`: `{"Language": bytes, ...}`, largest first.
pub fn stats<S: RevisionStore, C: Classifier>(
    orchestrator: &Orchestrator<S, C>,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> CommandResult {
    let outcome = orchestrator.run(global.commit.as_deref(), global.force)?;
    tracing::debug!(mode = ?outcome.mode, files = outcome.stats.len(), "computed statistics");
    print_json(out, &outcome.stats.totals())
}

/// `langstat breakdown`: `{"path": "Language", ...}`, sorted by path.
pub fn breakdown<S: RevisionStore, C: Classifier>(
    orchestrator: &Orchestrator<S, C>,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> CommandResult {
    let outcome = orchestrator.run(global.commit.as_deref(), global.force)?;
    print_json(out, &outcome.stats.breakdown())
}

/// `langstat dump-cache`: the stored `[version, revision, files]` tuple, or `null`.
pub fn dump_cache<S: RevisionStore, C: Classifier>(
    orchestrator: &Orchestrator<S, C>,
    out: &mut impl Write,
) -> CommandResult {
    print_json(out, &orchestrator.dump_raw_cache())
}

/// `langstat clear`
pub fn clear<S: RevisionStore, C: Classifier>(orchestrator: &Orchestrator<S, C>) -> CommandResult {
    orchestrator.clear_cache()?;
    Ok(0)
}

/// `langstat disable`
pub fn disable<S: RevisionStore, C: Classifier>(
    orchestrator: &Orchestrator<S, C>,
) -> CommandResult {
    orchestrator.freeze()?;
    Ok(0)
}

fn print_json<T: serde::Serialize + ?Sized>(out: &mut impl Write, value: &T) -> CommandResult {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(0)
}
