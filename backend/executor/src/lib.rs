//! Running the transcription engine and picking up what it wrote.

pub mod collect;
pub mod engine;
pub mod locator;
pub mod process;

pub use collect::{list_dir, OutputCollector, TranscriptArtifact};
pub use engine::{TranscriptionInvoker, OUTPUT_DIR};
pub use locator::SystemBinaryLocator;
pub use process::TokioCommandRunner;
