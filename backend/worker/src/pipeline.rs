use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use runscribe_config::WorkerConfig;
use runscribe_core::{
    BinaryLocator, CommandRunner, JobError, JobHandler, JobRequest, JobResult, Transcript,
};
use runscribe_executor::{OutputCollector, SystemBinaryLocator, TokioCommandRunner, TranscriptionInvoker};
use runscribe_media::{AudioNormalizer, AudioSource, Downloader, InputResolver};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::result::build_result;

const STAGING_PREFIX: &str = "runscribe-";

/// Runs one transcription job end to end.
///
/// Stages run strictly in order and the first failure ends the job. The
/// pipeline itself holds only configuration, so one instance serves any
/// number of jobs.
pub struct TranscriptionPipeline {
    resolver: InputResolver,
    normalizer: AudioNormalizer,
    invoker: TranscriptionInvoker,
    collector: OutputCollector,
    staging_root: Option<PathBuf>,
}

impl TranscriptionPipeline {
    pub fn new(
        config: &WorkerConfig,
        locator: Arc<dyn BinaryLocator>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, JobError> {
        let downloader = Downloader::new(
            config.download_timeout(),
            &config.user_agent,
            config.max_download_bytes,
        )?;

        Ok(Self {
            resolver: InputResolver::new(downloader),
            normalizer: AudioNormalizer::new(&config.transcoder_binary, runner.clone()),
            invoker: TranscriptionInvoker::new(&config.engine_binary, locator, runner),
            collector: OutputCollector::new(&config.transcript_extension),
            staging_root: config.staging_root.clone(),
        })
    }

    /// Pipeline wired to the real PATH lookup and real processes.
    pub fn from_config(config: &WorkerConfig) -> Result<Self, JobError> {
        let locator = SystemBinaryLocator::new()
            .with_fallback(&config.engine_binary, &config.engine_fallback_path);
        Self::new(config, Arc::new(locator), Arc::new(TokioCommandRunner))
    }

    /// Run the job and return its transcript.
    ///
    /// The source is validated and the engine located before anything touches
    /// the disk or network, so a bad request or a broken deployment costs
    /// nothing. The staging directory is removed on every path out.
    pub async fn run(&self, request: &JobRequest) -> Result<Transcript, JobError> {
        let source = AudioSource::from_request(request)?;
        let engine = self.invoker.locate()?;

        let staging = self.create_staging_dir()?;
        debug!(path = %staging.path().display(), "Created staging directory");

        let outcome = self.run_staged(request, source, &engine, staging.path()).await;

        let staging_path = staging.path().to_path_buf();
        if let Err(e) = staging.close() {
            warn!(path = %staging_path.display(), error = %e, "Failed to remove staging directory");
        }
        outcome
    }

    async fn run_staged(
        &self,
        request: &JobRequest,
        source: AudioSource,
        engine: &Path,
        staging_dir: &Path,
    ) -> Result<Transcript, JobError> {
        let staged = self.resolver.stage(request, source, staging_dir).await?;
        let normalized = self.normalizer.normalize(&staged, staging_dir).await?;
        let output_dir = self
            .invoker
            .invoke(engine, &normalized.path, request, staging_dir)
            .await?;
        let artifact = self.collector.collect(&output_dir).await?;

        Ok(Transcript::new(request, staged.filename, artifact.text))
    }

    fn create_staging_dir(&self) -> Result<TempDir, JobError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let created = match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        created.map_err(|e| JobError::io("creating staging directory", e))
    }
}

#[async_trait]
impl JobHandler for TranscriptionPipeline {
    async fn handle(&self, request: JobRequest) -> JobResult {
        let outcome = self.run(&request).await;
        build_result(&request, outcome)
    }
}
