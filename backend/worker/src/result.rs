//! Job result assembly.

use runscribe_core::{JobError, JobRequest, JobResult, Transcript};
use tracing::{info, warn};

/// Turn a pipeline outcome into the one result the caller sees. Errors are
/// never propagated past this point.
pub fn build_result(request: &JobRequest, outcome: Result<Transcript, JobError>) -> JobResult {
    match outcome {
        Ok(transcript) => {
            info!(
                filename = %transcript.filename,
                model = %request.model(),
                chars = transcript.transcript_txt.chars().count(),
                "Job completed"
            );
            JobResult::Success(transcript)
        }
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "Job failed");
            err.into()
        }
    }
}
