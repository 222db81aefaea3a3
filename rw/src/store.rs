//! Fingerprint store - persists the last computed hash string
//!
//! The store is a plain-text file holding exactly one hash. It is created on
//! first save and overwritten in place on every change.

use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistent store for the last computed fingerprint
pub struct FingerprintStore {
    path: PathBuf,
}

impl FingerprintStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored fingerprint, if any.
    ///
    /// A missing file or an empty file both mean "no prior fingerprint".
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "FingerprintStore::load: no store file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .context(format!("Failed to read fingerprint store {}", self.path.display()))?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    /// Overwrite the stored fingerprint, creating parent directories as needed
    pub fn save(&self, fingerprint: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create store directory {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{}\n", fingerprint))
            .context(format!("Failed to write fingerprint store {}", self.path.display()))?;
        debug!(path = %self.path.display(), "FingerprintStore::save: fingerprint persisted");
        Ok(())
    }
}
