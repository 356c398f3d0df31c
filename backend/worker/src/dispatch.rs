//! Job dispatch: the one place a job handler is called from.

use std::any::Any;
use std::sync::Arc;

use runscribe_core::{JobHandler, JobRequest, JobResult};
use tokio::task::JoinError;
use tracing::{error, info, info_span, Instrument};

/// Run one job on its own task under a `job` span.
///
/// A panic inside the handler is contained and reported as an
/// `internal error` result, so the caller always gets a well-formed result.
pub async fn dispatch(handler: Arc<dyn JobHandler>, job_id: &str, request: JobRequest) -> JobResult {
    let span = info_span!("job", job_id = %job_id);

    async move {
        let logged = serde_json::to_value(&request)
            .map(|v| logging::redact_job_input(&v))
            .unwrap_or_default();
        info!(input = %logged, "Job received");

        let task = tokio::spawn(async move { handler.handle(request).await }.in_current_span());
        match task.await {
            Ok(result) => result,
            Err(e) => {
                let message = join_error_message(e);
                error!(error = %message, "Job handler crashed");
                JobResult::failure(format!("internal error: {message}"))
            }
        }
    }
    .instrument(span)
    .await
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "job was cancelled".to_string();
    }
    panic_text(err.into_panic())
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
