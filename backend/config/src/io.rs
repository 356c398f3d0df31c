//! Config file loading.

use crate::schema::WorkerConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load and parse a YAML config file.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<WorkerConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(WorkerConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: WorkerConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config, WorkerConfig::default());
    }

    #[tokio::test]
    async fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.yaml");
        std::fs::write(
            &path,
            "engine_fallback_path: /opt/faster-whisper-xxl\nmax_download_bytes: 500000000\nlog_format: json\n",
        )
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.engine_fallback_path, Path::new("/opt/faster-whisper-xxl"));
        assert_eq!(config.max_download_bytes, Some(500_000_000));
        assert_eq!(config.log_format, crate::LogFormat::Json);
        assert_eq!(config.engine_binary, "faster-whisper-xxl");
    }

    #[tokio::test]
    async fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.yaml");
        std::fs::write(&path, "port: [not a number").unwrap();
        assert!(load_config(&path).await.is_err());
    }
}
