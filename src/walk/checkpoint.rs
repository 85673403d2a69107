//! Checkpoint store
//!
//! Persists the locator of the last item that is still navigable, so an
//! interrupted walk can resume from it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{ArchiverError, Locator, Result};

/// Single-value checkpoint kept in a text file
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    /// File holding the locator
    path: PathBuf,
    /// Address prefix a locator must carry to be persisted
    item_prefix: String,
}

impl CheckpointStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>, item_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            item_prefix: item_prefix.into(),
        }
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored locator; missing or blank files are fatal
    pub fn read(&self) -> Result<Locator> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArchiverError::MissingCheckpoint(self.path.clone()))
            }
            Err(e) => {
                return Err(ArchiverError::with_context(
                    format!("Failed to read checkpoint {}", self.path.display()),
                    e,
                ))
            }
        };

        let value = content.trim();
        if value.is_empty() {
            return Err(ArchiverError::MissingCheckpoint(self.path.clone()));
        }

        Ok(Locator::from_url(value))
    }

    /// Persist `locator` if it belongs to the library.
    ///
    /// Returns whether the file was written. Foreign or half-redirected
    /// addresses are ignored.
    pub fn write(&self, locator: &Locator) -> Result<bool> {
        if !locator.has_prefix(&self.item_prefix) {
            tracing::debug!(%locator, "Not persisting foreign locator");
            return Ok(false);
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, locator.as_str())
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ArchiverError::checkpoint(format!(
                    "Failed to write {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        Ok(true)
    }
}
