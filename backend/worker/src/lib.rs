//! The transcription job pipeline.
//!
//! One call, one job: input resolution, normalization, engine invocation,
//! transcript collection, result assembly. Nothing is kept between jobs;
//! every file lives in a per-job staging directory that is removed when the
//! job ends.

pub mod dispatch;
pub mod pipeline;
pub mod result;

pub use dispatch::dispatch;
pub use pipeline::TranscriptionPipeline;
pub use result::build_result;
