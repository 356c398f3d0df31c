//! Core types, errors, and capability traits shared by every runscribe crate.

pub mod error;
pub mod job;
pub mod outcome;
pub mod traits;

pub use error::JobError;
pub use job::{JobEnvelope, JobFailure, JobRequest, JobResult, Transcript};
pub use outcome::{CommandFailure, CommandOutcome};
pub use traits::{BinaryLocator, CommandRunner, JobHandler};
