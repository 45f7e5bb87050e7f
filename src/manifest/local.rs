//! Local file-based manifest storage.
//!
//! The manifest is a pretty-printed JSON document in the project directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{BeadError, ManifestError, Result};

use super::store::ManifestStore;
use super::types::Manifest;

/// Manifest file name.
pub const MANIFEST_FILE: &str = "bead.json";

/// Local file-based manifest store.
#[derive(Debug, Clone)]
pub struct LocalManifestStore {
    /// Path to the manifest file.
    manifest_path: PathBuf,
}

impl LocalManifestStore {
    /// Creates a store for the manifest inside `project_dir`.
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self::with_manifest_path(project_dir.as_ref().join(MANIFEST_FILE))
    }

    /// Creates a store for a manifest at an explicit path.
    #[must_use]
    pub fn with_manifest_path(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    fn write_error(message: impl std::fmt::Display) -> BeadError {
        BeadError::Manifest(ManifestError::Write {
            message: message.to_string(),
        })
    }
}

#[async_trait]
impl ManifestStore for LocalManifestStore {
    async fn load(&self) -> Result<Manifest> {
        if !fs::try_exists(&self.manifest_path).await? {
            return Err(BeadError::Manifest(ManifestError::Missing {
                path: self.manifest_path.clone(),
            }));
        }

        debug!("Loading manifest from: {}", self.manifest_path.display());

        let content = fs::read_to_string(&self.manifest_path).await.map_err(|e| {
            BeadError::Manifest(ManifestError::Corrupted {
                message: format!("Failed to read manifest file: {e}"),
            })
        })?;

        let manifest: Manifest = serde_json::from_str(&content).map_err(|e| {
            BeadError::Manifest(ManifestError::Corrupted {
                message: format!("Failed to parse manifest file: {e}"),
            })
        })?;

        Ok(manifest)
    }

    async fn save(&self, manifest: &Manifest) -> Result<()> {
        info!("Saving manifest to: {}", self.manifest_path.display());

        let mut content = serde_json::to_string_pretty(manifest).map_err(|e| {
            BeadError::Manifest(ManifestError::Serialization {
                message: format!("Failed to serialize manifest: {e}"),
            })
        })?;
        content.push('\n');

        // Write to a temporary file first, then rename for atomicity
        let temp_path = self.manifest_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Self::write_error(format!("Failed to create temp manifest file: {e}")))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Self::write_error(format!("Failed to write manifest file: {e}")))?;

        file.sync_all()
            .await
            .map_err(|e| Self::write_error(format!("Failed to sync manifest file: {e}")))?;

        fs::rename(&temp_path, &self.manifest_path)
            .await
            .map_err(|e| Self::write_error(format!("Failed to rename manifest file: {e}")))?;

        debug!("Manifest saved successfully");
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        Ok(fs::try_exists(&self.manifest_path).await?)
    }

    fn location(&self) -> &Path {
        &self.manifest_path
    }
}
