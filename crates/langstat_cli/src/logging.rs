//! Tracing subscriber setup.
//!
//! Logs always go to stderr; stdout carries only the JSON document.

use langstat_config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::GlobalArgs;

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise `-v` selects debug, `-q` selects
/// error, and the config's `logging.level` applies.
pub fn init(global: &GlobalArgs, config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(global, config)));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn default_level<'a>(global: &GlobalArgs, config: &'a LoggingConfig) -> &'a str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        &config.level
    }
}
