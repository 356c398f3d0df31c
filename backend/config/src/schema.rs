//! Typed worker configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults;

/// Console log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Runtime configuration for the transcription worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Speech-recognition engine, looked up on PATH.
    pub engine_binary: String,
    /// Where the engine lives when it is not on PATH.
    pub engine_fallback_path: PathBuf,
    /// Audio transcoder, resolved by the OS at spawn time.
    pub transcoder_binary: String,
    pub download_timeout_secs: u64,
    pub user_agent: String,
    /// Abort downloads larger than this. Unlimited when unset.
    pub max_download_bytes: Option<u64>,
    /// Parent directory for per-job staging directories (OS temp dir when unset).
    pub staging_root: Option<PathBuf>,
    /// Suffix of the transcript file the engine writes, without the dot.
    pub transcript_extension: String,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Enables the rolling JSON log file when set.
    pub log_dir: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            engine_binary: defaults::ENGINE_BINARY.to_string(),
            engine_fallback_path: PathBuf::from(defaults::ENGINE_FALLBACK_PATH),
            transcoder_binary: defaults::TRANSCODER_BINARY.to_string(),
            download_timeout_secs: defaults::DOWNLOAD_TIMEOUT_SECS,
            user_agent: defaults::USER_AGENT.to_string(),
            max_download_bytes: None,
            staging_root: None,
            transcript_extension: defaults::TRANSCRIPT_EXTENSION.to_string(),
            bind_address: defaults::BIND_ADDRESS.to_string(),
            port: defaults::PORT,
            log_level: defaults::LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            log_dir: None,
        }
    }
}

impl WorkerConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
