//! Default values for every `WorkerConfig` field.

pub const ENGINE_BINARY: &str = "faster-whisper-xxl";

pub const ENGINE_FALLBACK_PATH: &str = "/faster-whisper-xxl";

pub const TRANSCODER_BINARY: &str = "ffmpeg";

pub const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Some audio hosts refuse requests without a browser-looking user agent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const TRANSCRIPT_EXTENSION: &str = "txt";

pub const BIND_ADDRESS: &str = "0.0.0.0";

pub const PORT: u16 = 8000;

pub const LOG_LEVEL: &str = "info";
