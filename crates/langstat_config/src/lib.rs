//! Parsing and validation of `langstat.toml` configuration files.
//!
//! Every section is optional; a missing file yields [`LangstatConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_optional_config, CONFIG_FILE};
pub use types::*;
