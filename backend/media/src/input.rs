//! Input resolution: decide where the audio comes from and stage it.

use std::path::{Path, PathBuf};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use runscribe_core::{JobError, JobRequest};
use tracing::{debug, info};

use crate::download::Downloader;
use crate::filename::resolve_filename;

/// Standard alphabet, padding optional.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Subdirectory of the staging directory that holds the raw input.
const RAW_DIR: &str = "raw";

/// Where the job's audio comes from. An embedded payload wins over a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    Embedded(Vec<u8>),
    Remote(String),
}

impl AudioSource {
    /// Pick and validate the source. Decoding happens here so a malformed
    /// payload is rejected before any other work.
    pub fn from_request(request: &JobRequest) -> Result<Self, JobError> {
        if let Some(payload) = request.payload() {
            return decode_payload(payload).map(Self::Embedded);
        }
        match request.url() {
            Some(url) => Ok(Self::Remote(url.to_string())),
            None => Err(JobError::Input(
                "missing input.audio_base64 or input.audio_url".to_string(),
            )),
        }
    }
}

/// Decode an embedded audio payload.
///
/// Accepts an optional `data:<mime>;base64,` prefix and ignores whitespace
/// (payloads are often line-wrapped).
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, JobError> {
    let body = match payload.trim_start().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => payload,
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    PAYLOAD_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| JobError::Input(format!("invalid input.audio_base64: {e}")))
}

/// Raw audio on local disk. Lives as long as the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAudio {
    pub path: PathBuf,
    pub filename: String,
}

impl StagedAudio {
    /// Lowercased extension of the resolved filename, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Writes the job's audio into the staging directory.
pub struct InputResolver {
    downloader: Downloader,
}

impl InputResolver {
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }

    /// Stage `source` under `staging_dir` using the filename resolved from
    /// `request`. Writes exactly one file.
    pub async fn stage(
        &self,
        request: &JobRequest,
        source: AudioSource,
        staging_dir: &Path,
    ) -> Result<StagedAudio, JobError> {
        let filename = resolve_filename(request);
        let raw_dir = staging_dir.join(RAW_DIR);
        tokio::fs::create_dir_all(&raw_dir)
            .await
            .map_err(|e| JobError::io(format!("creating {}", raw_dir.display()), e))?;
        let path = raw_dir.join(&filename);

        match source {
            AudioSource::Embedded(bytes) => {
                debug!(filename = %filename, bytes = bytes.len(), "Staging embedded audio");
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|e| JobError::io(format!("writing {}", path.display()), e))?;
            }
            AudioSource::Remote(url) => {
                let bytes = self.downloader.fetch_to(&url, &path).await?;
                info!(filename = %filename, bytes, "Downloaded audio");
            }
        }

        Ok(StagedAudio { path, filename })
    }
}
