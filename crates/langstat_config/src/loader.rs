//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::LangstatConfig;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "langstat.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Loads and validates a configuration file at an explicit path.
pub fn load_config(path: &Path) -> Result<LangstatConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Loads `<dir>/langstat.toml` if it exists, otherwise returns the defaults.
pub fn load_optional_config(dir: &Path) -> Result<LangstatConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if path.is_file() {
        load_config(&path)
    } else {
        Ok(LangstatConfig::default())
    }
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LangstatConfig, ConfigError> {
    let config: LangstatConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates value ranges and cross-field constraints.
fn validate_config(config: &LangstatConfig) -> Result<(), ConfigError> {
    let file_name = &config.cache.file_name;
    if file_name.is_empty()
        || file_name.contains(['/', '\\'])
        || file_name == "."
        || file_name == ".."
    {
        return Err(ConfigError::ValidationError(format!(
            "cache.file_name must be a bare file name, got '{file_name}'"
        )));
    }
    if config.cache.compression_level > 9 {
        return Err(ConfigError::ValidationError(format!(
            "cache.compression_level must be between 0 and 9, got {}",
            config.cache.compression_level
        )));
    }
    if config.scan.max_tree_size == 0 {
        return Err(ConfigError::ValidationError(
            "scan.max_tree_size must be positive".to_string(),
        ));
    }
    for (key, lang) in config
        .classifier
        .extensions
        .iter()
        .chain(config.classifier.filenames.iter())
    {
        if key.is_empty() || lang.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "classifier override '{key}' must map a non-empty key to a language name"
            )));
        }
    }
    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "logging.level must be one of {}, got '{}'",
            LOG_LEVELS.join(", "),
            config.logging.level
        )));
    }
    Ok(())
}
