//! Audio normalization: make sure the engine gets mp3.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use runscribe_core::{CommandFailure, CommandRunner, JobError};
use tracing::{debug, info, warn};

use crate::input::StagedAudio;

/// Extension (and codec) the transcription engine expects.
pub const TARGET_EXTENSION: &str = "mp3";

/// Transcoder output, written at the root of the staging directory.
pub const NORMALIZED_FILENAME: &str = "input.mp3";

/// LAME VBR quality; 2 is roughly 190 kbit/s.
const VBR_QUALITY: &str = "2";

/// Audio the engine can read directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAudio {
    pub path: PathBuf,
    /// `false` when the staged file was passed through untouched.
    pub transcoded: bool,
}

pub struct AudioNormalizer {
    transcoder: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl AudioNormalizer {
    pub fn new(transcoder: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            transcoder: transcoder.into(),
            runner,
        }
    }

    pub fn needs_transcode(staged: &StagedAudio) -> bool {
        staged.extension().as_deref() != Some(TARGET_EXTENSION)
    }

    /// `-y -i <input> -vn -acodec libmp3lame -q:a 2 <output>`: drop video and
    /// cover-art streams, encode VBR mp3, overwrite.
    pub fn transcode_args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-vn".into(),
            "-acodec".into(),
            "libmp3lame".into(),
            "-q:a".into(),
            VBR_QUALITY.into(),
            output.as_os_str().to_owned(),
        ]
    }

    /// Pass mp3 through unchanged, transcode anything else into
    /// `<staging_dir>/input.mp3`.
    pub async fn normalize(
        &self,
        staged: &StagedAudio,
        staging_dir: &Path,
    ) -> Result<NormalizedAudio, JobError> {
        if !Self::needs_transcode(staged) {
            debug!(filename = %staged.filename, "Audio already mp3; skipping transcode");
            return Ok(NormalizedAudio {
                path: staged.path.clone(),
                transcoded: false,
            });
        }

        let output = staging_dir.join(NORMALIZED_FILENAME);
        let args = Self::transcode_args(&staged.path, &output);
        info!(filename = %staged.filename, transcoder = %self.transcoder.display(), "Transcoding audio to mp3");

        let outcome = match self.runner.run(&self.transcoder, &args).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Failed to launch transcoder");
                return Err(JobError::Transcode(CommandFailure::spawn_error(
                    &self.transcoder,
                    &args,
                    &e,
                )));
            }
        };

        if !outcome.success() {
            warn!(exit_code = ?outcome.exit_code, "Transcoder exited with failure");
            return Err(JobError::Transcode(CommandFailure::from_invocation(
                &self.transcoder,
                &args,
                outcome,
            )));
        }

        Ok(NormalizedAudio {
            path: output,
            transcoded: true,
        })
    }
}
