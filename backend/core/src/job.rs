use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JobError;

pub const DEFAULT_FILENAME: &str = "audio.bin";
pub const DEFAULT_MODEL: &str = "large-v2";
pub const DEFAULT_LANGUAGE: &str = "zh";
pub const DEFAULT_VAD_METHOD: &str = "pyannote_v3";
pub const DEFAULT_DIARIZE: &str = "pyannote_v3.1";
pub const DEFAULT_OUTPUT_FORMAT: &str = "txt";

/// What the job dispatcher delivers: an optional id and the job input.
///
/// The input stays raw JSON until `into_request`, so a wrong-typed option
/// becomes a job error instead of a rejected envelope.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobEnvelope {
    pub id: Option<String>,
    pub input: Option<Value>,
}

impl JobEnvelope {
    /// Parses an envelope from raw bytes. Only unparseable JSON is an error.
    pub fn from_slice(raw: &[u8]) -> Result<Self, JobError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| JobError::Input(format!("invalid job envelope: {e}")))?;
        Ok(Self::from_value(value))
    }

    /// A non-string id is ignored; anything other than an object carries no input.
    pub fn from_value(mut value: Value) -> Self {
        let id = value.get("id").and_then(Value::as_str).map(str::to_string);
        let input = value.get_mut("input").map(Value::take);
        Self { id, input }
    }

    /// The job input; a missing or `null` input is an empty request.
    pub fn into_request(self) -> Result<JobRequest, JobError> {
        match self.input {
            None | Some(Value::Null) => Ok(JobRequest::default()),
            Some(input) => serde_json::from_value(input)
                .map_err(|e| JobError::Input(format!("invalid input: {e}"))),
        }
    }
}

/// One transcription job as received. Missing, `null` and blank options all
/// fall back to their defaults through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRequest {
    pub audio_base64: Option<String>,
    pub audio_url: Option<String>,
    pub filename: Option<String>,
    pub model: Option<String>,
    pub language: Option<String>,
    pub vad_method: Option<String>,
    pub diarize: Option<String>,
    pub output_format: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl JobRequest {
    pub fn payload(&self) -> Option<&str> {
        present(&self.audio_base64)
    }

    pub fn url(&self) -> Option<&str> {
        present(&self.audio_url).map(str::trim)
    }

    /// Caller-supplied filename, `None` when absent or the generic placeholder.
    pub fn explicit_filename(&self) -> Option<&str> {
        present(&self.filename).filter(|name| name.trim() != DEFAULT_FILENAME)
    }

    pub fn model(&self) -> &str {
        present(&self.model).unwrap_or(DEFAULT_MODEL)
    }

    pub fn language(&self) -> &str {
        present(&self.language).unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn vad_method(&self) -> &str {
        present(&self.vad_method).unwrap_or(DEFAULT_VAD_METHOD)
    }

    pub fn diarize(&self) -> &str {
        present(&self.diarize).unwrap_or(DEFAULT_DIARIZE)
    }

    pub fn output_format(&self) -> &str {
        present(&self.output_format).unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }
}

/// Successful job output. Every option is echoed so the caller can match
/// the result to its request without tracking ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub filename: String,
    pub model: String,
    pub language: String,
    pub vad_method: String,
    pub diarize: String,
    pub output_format: String,
    pub transcript_txt: String,
}

impl Transcript {
    pub fn new(request: &JobRequest, filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            model: request.model().to_string(),
            language: request.language().to_string(),
            vad_method: request.vad_method().to_string(),
            diarize: request.diarize().to_string(),
            output_format: request.output_format().to_string(),
            transcript_txt: text.into(),
        }
    }
}

/// Failed job output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl From<&JobError> for JobFailure {
    fn from(err: &JobError) -> Self {
        Self {
            error: err.to_string(),
            files: err.files().map(<[String]>::to_vec),
        }
    }
}

/// Exactly one of these comes back per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResult {
    Success(Transcript),
    Error(JobFailure),
}

impl JobResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Error(JobFailure {
            error: message.into(),
            files: None,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<JobError> for JobResult {
    fn from(err: JobError) -> Self {
        Self::Error(JobFailure::from(&err))
    }
}
