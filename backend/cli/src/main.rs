mod api;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use runscribe_config::{LogFormat, WorkerConfig};
use runscribe_core::{JobEnvelope, JobHandler};
use runscribe_worker::TranscriptionPipeline;

use api::AppState;

#[derive(Parser)]
#[command(name = "runscribe")]
#[command(about = "Serverless audio transcription worker")]
#[command(version)]
struct Cli {
    /// YAML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one job and print its result as JSON
    Run {
        /// Path to a job envelope (`{"id": .., "input": {..}}`)
        #[arg(long, required_unless_present = "test_input", conflicts_with = "test_input")]
        input: Option<PathBuf>,
        /// Job envelope given inline
        #[arg(long)]
        test_input: Option<String>,
    },
    /// Serve jobs over HTTP (`POST /runsync`)
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check whether a local worker is up
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = runscribe_config::load_and_prepare(cli.config.as_deref()).await?;

    logging::init_logger(
        &config.log_level,
        config.log_format == LogFormat::Json,
        config.log_dir.as_deref(),
    );

    match cli.command {
        Commands::Run { input, test_input } => run_once(&config, input, test_input).await,
        Commands::Serve { port } => {
            let config = WorkerConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status => {
            let url = format!("http://localhost:{}/health", config.port);
            match reqwest::get(&url).await {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(_) => {
                    println!("runscribe is not running on port {}", config.port);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// One-shot mode: read an envelope, run it, print the result. Exits non-zero
/// when the job failed.
async fn run_once(
    config: &WorkerConfig,
    input: Option<PathBuf>,
    test_input: Option<String>,
) -> Result<ExitCode> {
    let raw = match (input, test_input) {
        (Some(path), _) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read job input: {}", path.display()))?,
        (None, Some(inline)) => inline,
        (None, None) => anyhow::bail!("either --input or --test-input is required"),
    };
    let (id, request) = match JobEnvelope::from_slice(raw.as_bytes()) {
        Ok(mut envelope) => (envelope.id.take(), envelope.into_request()),
        Err(err) => (None, Err(err)),
    };
    let id = id.unwrap_or_else(|| "local".to_string());

    let handler: Arc<dyn JobHandler> = Arc::new(TranscriptionPipeline::from_config(config)?);
    let result = api::run_job(handler, &id, request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_server(config: WorkerConfig) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        engine = %config.engine_binary,
        "Starting runscribe worker"
    );

    let handler: Arc<dyn JobHandler> = Arc::new(TranscriptionPipeline::from_config(&config)?);
    let app = api::build_router(Arc::new(AppState { handler })).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
