//! Getting job audio onto local disk in a form the engine accepts.
//!
//! [`InputResolver`] stages the raw bytes (embedded payload or download) and
//! [`AudioNormalizer`] transcodes them to mp3 when needed.

pub mod download;
pub mod filename;
pub mod input;
pub mod normalize;

pub use download::Downloader;
pub use filename::{filename_from_url, resolve_filename, sanitize_filename};
pub use input::{decode_payload, AudioSource, InputResolver, StagedAudio};
pub use normalize::{AudioNormalizer, NormalizedAudio, NORMALIZED_FILENAME, TARGET_EXTENSION};
