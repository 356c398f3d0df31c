//! Structured logging for the transcription worker.
//!
//! Handles subscriber setup (console text or JSON, optional rolling file) and
//! redaction of job inputs before they reach a log line.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::{redact_job_input, redact_sensitive_data};
