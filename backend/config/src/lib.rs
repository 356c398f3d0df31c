//! `runscribe-config`: worker configuration.
//!
//! Provides:
//! - Typed `WorkerConfig` with defaults for every field
//! - Optional YAML config file
//! - `RUNSCRIBE_*` environment overrides (env wins over file)
//! - Validation with field paths

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, apply_env_overrides_with};
pub use io::load_config;
pub use schema::{LogFormat, WorkerConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};
use std::path::Path;

/// Load the optional config file, apply env overrides, and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: Option<&Path>) -> Result<WorkerConfig> {
    let config = match path {
        Some(path) => load_config(path).await?,
        None => WorkerConfig::default(),
    };

    let config = apply_env_overrides(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        bail!("invalid configuration: {first}");
    }

    Ok(config)
}
