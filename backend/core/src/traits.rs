use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::job::{JobRequest, JobResult};
use crate::outcome::CommandOutcome;

/// Finds an executable by name. Swapped for a fake in tests so no real
/// PATH or filesystem lookup happens.
pub trait BinaryLocator: Send + Sync {
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// Runs an external program to completion and captures its output.
///
/// An `Err` means the process could not be started at all; a started process
/// that exits non-zero is still `Ok` and is judged by the caller.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<CommandOutcome>;
}

/// Turns one job request into exactly one result. Registered with the job
/// dispatcher at startup.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, request: JobRequest) -> JobResult;
}
