//! Configuration validation.
//!
//! Every setting is optional; values that are present must make sense.

use crate::domain::error::JournalError;
use crate::domain::metrics::ChartMode;
use crate::ports::config_port::ConfigPort;

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate_journal_config(config: &dyn ConfigPort) -> Result<(), JournalError> {
    validate_storage_path(config)?;
    validate_export_directory(config)?;
    validate_top_symbols(config)?;
    validate_chart_mode(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> JournalError {
    JournalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_storage_path(config: &dyn ConfigPort) -> Result<(), JournalError> {
    match config.get_string("storage", "path") {
        Some(s) if s.trim().is_empty() => Err(invalid("storage", "path", "path must not be empty")),
        _ => Ok(()),
    }
}

fn validate_export_directory(config: &dyn ConfigPort) -> Result<(), JournalError> {
    match config.get_string("export", "directory") {
        Some(s) if s.trim().is_empty() => {
            Err(invalid("export", "directory", "directory must not be empty"))
        }
        _ => Ok(()),
    }
}

fn validate_top_symbols(config: &dyn ConfigPort) -> Result<(), JournalError> {
    if let Some(raw) = config.get_string("dashboard", "top_symbols") {
        match raw.trim().parse::<i64>() {
            Ok(n) if n >= 1 => {}
            _ => {
                return Err(invalid(
                    "dashboard",
                    "top_symbols",
                    "top_symbols must be a positive integer",
                ));
            }
        }
    }
    Ok(())
}

fn validate_chart_mode(config: &dyn ConfigPort) -> Result<(), JournalError> {
    if let Some(raw) = config.get_string("dashboard", "chart_mode") {
        raw.parse::<ChartMode>()
            .map_err(|reason| invalid("dashboard", "chart_mode", reason))?;
    }
    Ok(())
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), JournalError> {
    if let Some(raw) = config.get_string("logging", "level") {
        let level = raw.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(invalid(
                "logging",
                "level",
                format!("level must be one of {}", LOG_LEVELS.join(", ")),
            ));
        }
    }
    Ok(())
}
