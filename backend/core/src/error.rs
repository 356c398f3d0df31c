use thiserror::Error;

use crate::outcome::CommandFailure;

/// Every way a single transcription job can fail.
///
/// Stages return these; the pipeline converts them into a `JobResult::Error`
/// at the job boundary.
#[derive(Debug, Error)]
pub enum JobError {
    /// Neither audio source given, or the embedded payload is malformed.
    #[error("{0}")]
    Input(String),

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("transcode failed: {0}")]
    Transcode(CommandFailure),

    #[error("{name} binary not found")]
    BinaryNotFound { name: String },

    #[error("transcription failed: {failure}")]
    Transcription {
        failure: CommandFailure,
        files: Vec<String>,
    },

    #[error("no transcript generated")]
    NoOutput { files: Vec<String> },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl JobError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Directory listing captured at failure time, if the stage had one.
    pub fn files(&self) -> Option<&[String]> {
        match self {
            Self::NoOutput { files } => Some(files),
            Self::Transcription { files, .. } => Some(files),
            _ => None,
        }
    }

    /// Short, stable label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Download { .. } => "download",
            Self::Transcode(_) => "transcode",
            Self::BinaryNotFound { .. } => "binary_not_found",
            Self::Transcription { .. } => "transcription",
            Self::NoOutput { .. } => "no_output",
            Self::Io { .. } => "io",
            Self::Internal(_) => "internal",
        }
    }
}
