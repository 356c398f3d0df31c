//! Config validation with field paths.

use crate::schema::WorkerConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &WorkerConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.engine_binary.trim().is_empty() {
        report.error("engine_binary", "Engine binary name cannot be empty");
    }
    if config.transcoder_binary.trim().is_empty() {
        report.error("transcoder_binary", "Transcoder binary name cannot be empty");
    }
    if config.download_timeout_secs == 0 {
        report.error("download_timeout_secs", "Download timeout must be greater than zero");
    }
    if config.transcript_extension.trim().is_empty() {
        report.error("transcript_extension", "Transcript extension cannot be empty");
    }
    if config.user_agent.trim().is_empty() {
        report.warn("user_agent", "Empty user agent; some hosts reject such requests");
    }
    if config.max_download_bytes == Some(0) {
        report.error("max_download_bytes", "Maximum download size must be greater than zero");
    }
    if !config.engine_fallback_path.is_absolute() {
        report.warn("engine_fallback_path", "Fallback path is relative to the working directory");
    }

    report
}
