use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Checks value ranges. Path existence is a startup precondition, not a config error.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.workers == 0 {
        return Err(validation("workers must be at least 1"));
    }

    if config.extensions.is_empty() || config.extensions.iter().any(|e| e.trim().is_empty()) {
        return Err(validation("extensions must list at least one non-empty extension"));
    }

    if config.stage_timeout_secs == 0 {
        return Err(validation("stage_timeout_secs must be at least 1"));
    }

    if config.ocr.program.trim().is_empty() {
        return Err(validation("ocr.program must not be empty"));
    }

    if config.ocr.languages.is_empty() || config.ocr.languages.iter().any(|l| l.trim().is_empty())
    {
        return Err(validation("ocr.languages must list at least one language"));
    }

    if !(50..=1200).contains(&config.ocr.dpi) {
        return Err(validation(format!(
            "ocr.dpi must be between 50 and 1200, got {}",
            config.ocr.dpi
        )));
    }

    if config.lint.max_suggestions == 0 {
        return Err(validation("lint.max_suggestions must be at least 1"));
    }

    Ok(())
}

fn validation(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}
