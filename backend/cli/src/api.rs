use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use runscribe_core::{JobEnvelope, JobError, JobHandler, JobRequest, JobResult};
use runscribe_worker::dispatch;

/// Shared application state for API handlers.
pub struct AppState {
    pub handler: Arc<dyn JobHandler>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Body returned by `POST /runsync`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub id: String,
    pub status: JobStatus,
    pub output: JobResult,
    pub completed_at: DateTime<Utc>,
    pub execution_ms: u64,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/runsync", post(run_sync))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "runscribe",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run one job to completion and return its result. Jobs without an id get
/// a fresh UUID. A body that is not a readable envelope still gets a
/// `FAILED` response.
async fn run_sync(State(state): State<Arc<AppState>>, body: Bytes) -> Json<RunResponse> {
    let started = Instant::now();
    let (id, request) = match JobEnvelope::from_slice(&body) {
        Ok(mut envelope) => (envelope.id.take(), envelope.into_request()),
        Err(err) => (None, Err(err)),
    };
    let id = id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let output = run_job(Arc::clone(&state.handler), &id, request).await;
    let status = if output.is_success() {
        JobStatus::Completed
    } else {
        JobStatus::Failed
    };

    Json(RunResponse {
        id,
        status,
        output,
        completed_at: Utc::now(),
        execution_ms: started.elapsed().as_millis() as u64,
    })
}

/// Dispatch a parsed request, or report why the input could not be read.
pub async fn run_job(
    handler: Arc<dyn JobHandler>,
    id: &str,
    request: Result<JobRequest, JobError>,
) -> JobResult {
    match request {
        Ok(request) => dispatch(handler, id, request).await,
        Err(err) => {
            warn!(job_id = %id, error = %err, "Rejected job input");
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use runscribe_core::{JobRequest, Transcript};

    /// Succeeds when a URL is given, fails otherwise.
    struct StubHandler;

    #[async_trait]
    impl JobHandler for StubHandler {
        async fn handle(&self, request: JobRequest) -> JobResult {
            match request.url() {
                Some(_) => JobResult::Success(Transcript::new(&request, "1.flac", "hello")),
                None => JobResult::failure("missing input.audio_base64 or input.audio_url"),
            }
        }
    }

    async fn spawn_app() -> String {
        let state = Arc::new(AppState {
            handler: Arc::new(StubHandler),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let base = spawn_app().await;
        let body: Value = reqwest::get(format!("{base}/health")).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "runscribe");
    }

    #[tokio::test]
    async fn runsync_completes_and_keeps_id() {
        let base = spawn_app().await;
        let resp: RunResponse = reqwest::Client::new()
            .post(format!("{base}/runsync"))
            .json(&json!({ "id": "job-42", "input": { "audio_url": "https://x/y/1.flac" } }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(resp.id, "job-42");
        assert_eq!(resp.status, JobStatus::Completed);
        let JobResult::Success(t) = resp.output else {
            panic!("expected success");
        };
        assert_eq!(t.filename, "1.flac");
        assert_eq!(t.transcript_txt, "hello");
    }

    #[tokio::test]
    async fn runsync_failure_assigns_id() {
        let base = spawn_app().await;
        let resp: Value = reqwest::Client::new()
            .post(format!("{base}/runsync"))
            .json(&json!({ "input": {} }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(resp["status"], "FAILED");
        assert_eq!(resp["output"]["error"], "missing input.audio_base64 or input.audio_url");
        assert!(uuid::Uuid::parse_str(resp["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn runsync_wrong_typed_option_fails_with_envelope() {
        let base = spawn_app().await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/runsync"))
            .json(&json!({ "id": "j", "input": { "audio_base64": "UklGRg==", "model": 5 } }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["id"], "j");
        assert_eq!(body["status"], "FAILED");
        let error = body["output"]["error"].as_str().unwrap();
        assert!(error.starts_with("invalid input: "), "{error}");
    }

    #[tokio::test]
    async fn runsync_unparseable_body_fails_with_envelope() {
        let base = spawn_app().await;
        let body: Value = reqwest::Client::new()
            .post(format!("{base}/runsync"))
            .body("{not json")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["status"], "FAILED");
        let error = body["output"]["error"].as_str().unwrap();
        assert!(error.starts_with("invalid job envelope: "), "{error}");
        assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    }
}
