//! langstat: per-language byte counts for a git repository.
//!
//! Prints JSON to stdout; diagnostics go to stderr. Results are cached in
//! the repository's control directory so repeated runs only classify the
//! files that changed.

#![warn(missing_docs)]

mod commands;
mod context;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Language statistics for git repositories.
#[derive(Parser, Debug)]
#[command(name = "langstat", version, about = "Language statistics for git repositories")]
pub struct Cli {
    /// Repository to analyse: a work tree, a `.git` directory, or a bare repository.
    /// Defaults to `./.git` when present, otherwise the current directory.
    #[arg(long, global = true)]
    pub git_dir: Option<PathBuf>,

    /// Revision to analyse (commit id, branch, tag, `HEAD~1`, ...). Defaults to `HEAD`.
    #[arg(long, global = true)]
    pub commit: Option<String>,

    /// Ignore the cache and classify every file.
    #[arg(long, global = true)]
    pub force: bool,

    /// Path to a custom `langstat.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log errors only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print total bytes per language, largest first.
    Stats,
    /// Print the language of every counted file.
    Breakdown,
    /// Print the raw cache record, or `null` when there is none.
    DumpCache,
    /// Delete the cache.
    Clear,
    /// Freeze empty statistics until the cache is cleared.
    Disable,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Repository location.
    pub git_dir: PathBuf,
    /// Revision expression to analyse.
    pub commit: Option<String>,
    /// Whether to bypass the cache.
    pub force: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
    /// Whether to log at debug level.
    pub verbose: bool,
    /// Whether to log errors only.
    pub quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        git_dir: cli.git_dir.unwrap_or_else(context::default_git_dir),
        commit: cli.commit,
        force: cli.force,
        config: cli.config,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match run(cli.command, &global) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn run(command: Command, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = context::load_config(global)?;
    logging::init(global, &config.logging);
    tracing::debug!(?command, git_dir = %global.git_dir.display(), "starting");

    let orchestrator = context::open(global, &config)?;
    let mut stdout = std::io::stdout().lock();
    match command {
        Command::Stats => commands::stats(&orchestrator, global, &mut stdout),
        Command::Breakdown => commands::breakdown(&orchestrator, global, &mut stdout),
        Command::DumpCache => commands::dump_cache(&orchestrator, &mut stdout),
        Command::Clear => commands::clear(&orchestrator),
        Command::Disable => commands::disable(&orchestrator),
    }
}
