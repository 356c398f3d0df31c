//! Remote audio fetch.

use std::error::Error as StdError;
use std::path::Path;
use std::time::Duration;

use runscribe_core::JobError;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Streams a URL to a local file with a fixed timeout and user agent.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    max_bytes: Option<u64>,
}

impl Downloader {
    pub fn new(timeout: Duration, user_agent: &str, max_bytes: Option<u64>) -> Result<Self, JobError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| JobError::Internal(format!("failed to build HTTP client: {}", error_chain(&e))))?;
        Ok(Self { client, max_bytes })
    }

    /// GET `url` and write the body to `dest`. Returns the number of bytes
    /// written. Any status >= 400, transport failure, or size-cap breach is
    /// a `JobError::Download`.
    pub async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, JobError> {
        debug!(url = %without_query(url), "Fetching audio");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(url, error_chain(&e)))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!(url = %without_query(url), status = status.as_u16(), "Audio download rejected");
            return Err(download_error(url, format!("HTTP status {status}")));
        }

        if let (Some(max), Some(len)) = (self.max_bytes, response.content_length()) {
            if len > max {
                return Err(download_error(url, too_large(max)));
            }
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| JobError::io(format!("creating {}", dest.display()), e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(url, error_chain(&e)))?
        {
            written += chunk.len() as u64;
            if let Some(max) = self.max_bytes.filter(|max| written > *max) {
                return Err(download_error(url, too_large(max)));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| JobError::io(format!("writing {}", dest.display()), e))?;
        }
        file.flush()
            .await
            .map_err(|e| JobError::io(format!("writing {}", dest.display()), e))?;

        Ok(written)
    }
}

fn download_error(url: &str, reason: String) -> JobError {
    JobError::Download {
        url: without_query(url).to_string(),
        reason,
    }
}

fn too_large(max: u64) -> String {
    format!("response exceeds the {max} byte limit")
}

/// Signed URLs carry credentials in the query; keep them out of messages.
fn without_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// reqwest's Display hides the underlying cause (DNS, TLS, timeout).
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn test_router() -> Router {
        Router::new()
            .route("/media/clip.flac", get(|| async { "fLaC-bytes" }))
            .route(
                "/ua",
                get(|headers: HeaderMap| async move {
                    headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .route("/big", get(|| async { vec![7u8; 4096] }))
            .route("/gone", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
            .route("/broken", get(|| async { (StatusCode::BAD_GATEWAY, "upstream") }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    "late"
                }),
            )
    }

    fn downloader(max_bytes: Option<u64>) -> Downloader {
        Downloader::new(Duration::from_secs(5), "Mozilla/5.0 (runscribe-test)", max_bytes).unwrap()
    }

    #[tokio::test]
    async fn writes_body_to_destination() {
        let base = serve(test_router()).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.flac");

        let written = downloader(None)
            .fetch_to(&format!("{base}/media/clip.flac?token=abc"), &dest)
            .await
            .unwrap();

        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fLaC-bytes");
    }

    #[tokio::test]
    async fn sends_configured_user_agent() {
        let base = serve(test_router()).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ua.txt");

        downloader(None).fetch_to(&format!("{base}/ua"), &dest).await.unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "Mozilla/5.0 (runscribe-test)");
    }

    #[tokio::test]
    async fn error_status_is_download_error() {
        let base = serve(test_router()).await;
        let dir = tempfile::tempdir().unwrap();

        for (path, code) in [("/gone", "404"), ("/broken", "502")] {
            let err = downloader(None)
                .fetch_to(&format!("{base}{path}?sig=secret"), &dir.path().join("x"))
                .await
                .unwrap_err();
            match err {
                JobError::Download { url, reason } => {
                    assert!(reason.contains(code), "{reason}");
                    assert!(!url.contains("secret"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn size_cap_aborts_download() {
        let base = serve(test_router()).await;
        let dir = tempfile::tempdir().unwrap();

        let err = downloader(Some(1024))
            .fetch_to(&format!("{base}/big"), &dir.path().join("big"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Download { ref reason, .. } if reason.contains("1024 byte limit")));

        let written = downloader(Some(4096))
            .fetch_to(&format!("{base}/big"), &dir.path().join("big"))
            .await
            .unwrap();
        assert_eq!(written, 4096);
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let base = serve(test_router()).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("slow");

        let started = std::time::Instant::now();
        let err = Downloader::new(Duration::from_secs(1), "Mozilla/5.0 (runscribe-test)", None)
            .unwrap()
            .fetch_to(&format!("{base}/slow"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Download { .. }), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn unreachable_host_is_download_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let err = downloader(None)
            .fetch_to(&format!("http://{addr}/a.wav"), &dir.path().join("a.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Download { .. }));
    }
}
