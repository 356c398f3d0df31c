//! Transcription engine invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use runscribe_core::{BinaryLocator, CommandFailure, CommandRunner, JobError, JobRequest};
use tracing::{info, warn};

use crate::collect::list_dir;

/// Engine output directory, relative to the staging directory.
pub const OUTPUT_DIR: &str = "out";

/// Finds and runs the speech-recognition engine for one job.
pub struct TranscriptionInvoker {
    binary_name: String,
    locator: Arc<dyn BinaryLocator>,
    runner: Arc<dyn CommandRunner>,
}

impl TranscriptionInvoker {
    pub fn new(
        binary_name: impl Into<String>,
        locator: Arc<dyn BinaryLocator>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            binary_name: binary_name.into(),
            locator,
            runner,
        }
    }

    /// Resolve the engine binary. Not finding it is fatal for the job: the
    /// deployment is broken and retrying will not help.
    pub fn locate(&self) -> Result<PathBuf, JobError> {
        self.locator
            .resolve(&self.binary_name)
            .ok_or_else(|| JobError::BinaryNotFound {
                name: self.binary_name.clone(),
            })
    }

    pub fn engine_args(audio: &Path, request: &JobRequest, output_dir: &Path) -> Vec<OsString> {
        vec![
            audio.as_os_str().to_owned(),
            "--model".into(),
            request.model().into(),
            "--language".into(),
            request.language().into(),
            "--vad_method".into(),
            request.vad_method().into(),
            "--diarize".into(),
            request.diarize().into(),
            "--output_format".into(),
            request.output_format().into(),
            "--output_dir".into(),
            output_dir.as_os_str().to_owned(),
        ]
    }

    /// Run `engine` on `audio`, writing into `<staging_dir>/out`, which is
    /// created first. Returns the output directory.
    ///
    /// Fails only when the engine cannot start or exits non-zero; the error
    /// carries both streams verbatim plus whatever the engine left behind.
    pub async fn invoke(
        &self,
        engine: &Path,
        audio: &Path,
        request: &JobRequest,
        staging_dir: &Path,
    ) -> Result<PathBuf, JobError> {
        let output_dir = staging_dir.join(OUTPUT_DIR);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| JobError::io(format!("creating {}", output_dir.display()), e))?;

        let args = Self::engine_args(audio, request, &output_dir);
        info!(
            engine = %engine.display(),
            model = %request.model(),
            language = %request.language(),
            output_format = %request.output_format(),
            "Running transcription engine"
        );

        let failure = match self.runner.run(engine, &args).await {
            Ok(outcome) if outcome.success() => return Ok(output_dir),
            Ok(outcome) => {
                warn!(exit_code = ?outcome.exit_code, "Transcription engine exited with failure");
                CommandFailure::from_invocation(engine, &args, outcome)
            }
            Err(e) => {
                warn!(error = %e, "Failed to launch transcription engine");
                CommandFailure::spawn_error(engine, &args, &e)
            }
        };

        Err(JobError::Transcription {
            failure,
            files: list_dir(&output_dir).await,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use runscribe_core::CommandOutcome;
    use std::sync::Mutex;

    struct FixedLocator(Option<PathBuf>);

    impl BinaryLocator for FixedLocator {
        fn resolve(&self, _name: &str) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    struct ScriptedRunner {
        reply: CommandOutcome,
        calls: Mutex<Vec<Vec<OsString>>>,
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, _program: &Path, args: &[OsString]) -> std::io::Result<CommandOutcome> {
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(self.reply.clone())
        }
    }

    fn invoker(found: Option<&str>, reply: CommandOutcome) -> (TranscriptionInvoker, Arc<ScriptedRunner>) {
        let runner = Arc::new(ScriptedRunner {
            reply,
            calls: Mutex::new(Vec::new()),
        });
        let invoker = TranscriptionInvoker::new(
            "faster-whisper-xxl",
            Arc::new(FixedLocator(found.map(PathBuf::from))),
            runner.clone(),
        );
        (invoker, runner)
    }

    #[test]
    fn locate_reports_missing_binary() {
        let (invoker, runner) = invoker(None, CommandOutcome::default());
        let err = invoker.locate().unwrap_err();
        assert!(matches!(err, JobError::BinaryNotFound { ref name } if name == "faster-whisper-xxl"));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn args_carry_every_option_in_order() {
        let req = JobRequest {
            model: Some("medium".into()),
            language: Some("en".into()),
            ..Default::default()
        };
        let args: Vec<_> =
            TranscriptionInvoker::engine_args(Path::new("/s/input.mp3"), &req, Path::new("/s/out"))
                .into_iter()
                .map(|a| a.into_string().unwrap())
                .collect();
        assert_eq!(
            args,
            [
                "/s/input.mp3",
                "--model",
                "medium",
                "--language",
                "en",
                "--vad_method",
                "pyannote_v3",
                "--diarize",
                "pyannote_v3.1",
                "--output_format",
                "txt",
                "--output_dir",
                "/s/out",
            ]
        );
    }

    #[tokio::test]
    async fn success_creates_and_returns_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (invoker, runner) = invoker(Some("/usr/bin/fw"), CommandOutcome::new(Some(0), "done", ""));
        let engine = invoker.locate().unwrap();

        let out = invoker
            .invoke(&engine, &dir.path().join("input.mp3"), &JobRequest::default(), dir.path())
            .await
            .unwrap();
        assert_eq!(out, dir.path().join("out"));
        assert!(out.is_dir());
        assert_eq!(runner.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_stdout_and_stderr_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let stdout = "Standalone Faster-Whisper-XXL r245\nLoading model large-v2";
        let stderr = "RuntimeError: CUDA failed with error out of memory\n";
        let (invoker, _) = invoker(Some("/usr/bin/fw"), CommandOutcome::new(Some(1), stdout, stderr));

        let err = invoker
            .invoke(Path::new("/usr/bin/fw"), &dir.path().join("input.mp3"), &JobRequest::default(), dir.path())
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains(stdout));
        assert!(msg.contains(stderr));
        assert_eq!(err.files(), Some(&[][..]));
    }
}
