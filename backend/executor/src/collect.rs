//! Transcript discovery in the engine's output directory.

use std::path::{Path, PathBuf};

use runscribe_core::JobError;
use tracing::{debug, warn};

/// The transcript file picked for the job, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptArtifact {
    pub path: PathBuf,
    pub text: String,
}

/// Finds `*.<extension>` files directly inside a directory.
pub struct OutputCollector {
    extension: String,
}

impl OutputCollector {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Read the lexicographically first matching file.
    ///
    /// Hidden files and subdirectories are ignored. Bytes that are not valid
    /// UTF-8 are dropped rather than failing the job. No match is a
    /// `JobError::NoOutput` carrying the full directory listing.
    pub async fn collect(&self, output_dir: &Path) -> Result<TranscriptArtifact, JobError> {
        let mut matches = self.matching_files(output_dir).await?;
        matches.sort();

        let Some(path) = matches.into_iter().next() else {
            let files = list_dir(output_dir).await;
            warn!(dir = %output_dir.display(), ?files, "No transcript found in engine output");
            return Err(JobError::NoOutput { files });
        };

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| JobError::io(format!("reading {}", path.display()), e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Read transcript");

        Ok(TranscriptArtifact {
            path,
            text: decode_dropping_invalid(&bytes),
        })
    }

    async fn matching_files(&self, dir: &Path) -> Result<Vec<PathBuf>, JobError> {
        let read_err = |e: std::io::Error| JobError::io(format!("listing {}", dir.display()), e);
        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let matches_ext = path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str());
            if hidden || !matches_ext {
                continue;
            }
            // Follows symlinks, like a shell glob would.
            if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                found.push(path);
            }
        }
        Ok(found)
    }
}

/// Sorted names of every entry in `dir`. Empty if it cannot be read; this
/// only feeds error diagnostics.
pub async fn list_dir(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return names;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    names
}

fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
