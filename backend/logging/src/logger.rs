//! Structured Logger
//!
//! Wraps `tracing` to provide text or JSON console output, an optional daily
//! rolling NDJSON file, and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global structured logger.
///
/// `RUST_LOG` takes precedence over `level`. Console output goes to stderr;
/// stdout carries job results in one-shot mode. Calling this twice is a no-op.
pub fn init_logger(level: &str, json: bool, log_dir: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let json_console = json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_ansi(false)
    });

    let text_console = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    // Rolling file appender: writes NDJSON to `<log_dir>/runscribe.log.YYYY-MM-DD`
    let file_layer = log_dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, "runscribe.log");
        fmt::layer()
            .json()
            .with_writer(appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(text_console)
        .with(file_layer)
        .try_init();
}
