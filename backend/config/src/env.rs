//! Environment variable overrides.
//!
//! Every field can be set through a `RUNSCRIBE_*` variable (log level through
//! `RUST_LOG`). Empty values are ignored. Numeric values that fail to parse
//! are ignored with a warning and the previous value is kept.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::schema::{LogFormat, WorkerConfig};

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: WorkerConfig) -> WorkerConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(
    mut config: WorkerConfig,
    env: &HashMap<String, String>,
) -> WorkerConfig {
    let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(v) = get("RUNSCRIBE_ENGINE_BIN") {
        config.engine_binary = v.to_string();
    }
    if let Some(v) = get("RUNSCRIBE_ENGINE_FALLBACK") {
        config.engine_fallback_path = PathBuf::from(v);
    }
    if let Some(v) = get("RUNSCRIBE_TRANSCODER_BIN") {
        config.transcoder_binary = v.to_string();
    }
    if let Some(v) = parsed(get("RUNSCRIBE_DOWNLOAD_TIMEOUT_SECS"), "RUNSCRIBE_DOWNLOAD_TIMEOUT_SECS") {
        config.download_timeout_secs = v;
    }
    if let Some(v) = get("RUNSCRIBE_USER_AGENT") {
        config.user_agent = v.to_string();
    }
    if let Some(v) = parsed(get("RUNSCRIBE_MAX_DOWNLOAD_BYTES"), "RUNSCRIBE_MAX_DOWNLOAD_BYTES") {
        config.max_download_bytes = Some(v);
    }
    if let Some(v) = get("RUNSCRIBE_STAGING_ROOT") {
        config.staging_root = Some(PathBuf::from(v));
    }
    if let Some(v) = get("RUNSCRIBE_TRANSCRIPT_EXT") {
        config.transcript_extension = v.trim_start_matches('.').to_string();
    }
    if let Some(v) = get("RUNSCRIBE_BIND") {
        config.bind_address = v.to_string();
    }
    if let Some(v) = parsed(get("RUNSCRIBE_PORT"), "RUNSCRIBE_PORT") {
        config.port = v;
    }
    if let Some(v) = get("RUST_LOG") {
        config.log_level = v.to_string();
    }
    if let Some(v) = get("RUNSCRIBE_LOG_FORMAT") {
        match v.to_ascii_lowercase().as_str() {
            "json" => config.log_format = LogFormat::Json,
            "text" => config.log_format = LogFormat::Text,
            other => warn!(value = %other, "Unknown RUNSCRIBE_LOG_FORMAT; keeping {:?}", config.log_format),
        }
    }
    if let Some(v) = get("RUNSCRIBE_LOG_DIR") {
        config.log_dir = Some(PathBuf::from(v));
    }

    config
}

fn parsed<T: FromStr>(value: Option<&str>, key: &str) -> Option<T> {
    let raw = value?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key = %key, value = %raw, "Ignoring unparseable env override");
            None
        }
    }
}
