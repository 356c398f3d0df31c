use std::collections::HashMap;
use std::path::PathBuf;

use runscribe_core::BinaryLocator;
use tracing::debug;

/// Looks binaries up on PATH, then at a fixed per-name fallback location.
#[derive(Debug, Clone, Default)]
pub struct SystemBinaryLocator {
    fallbacks: HashMap<String, PathBuf>,
}

impl SystemBinaryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.fallbacks.insert(name.into(), path.into());
        self
    }
}

impl BinaryLocator for SystemBinaryLocator {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if let Ok(path) = which::which(name) {
            debug!(binary = %name, path = %path.display(), "Found binary on PATH");
            return Some(path);
        }

        let fallback = self.fallbacks.get(name).filter(|path| path.is_file())?;
        debug!(binary = %name, path = %fallback.display(), "Using fallback binary path");
        Some(fallback.clone())
    }
}
