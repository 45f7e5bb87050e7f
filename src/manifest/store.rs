//! Manifest store trait definition.
//!
//! This module defines the common interface for manifest storage backends.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use super::types::Manifest;

/// Trait for manifest storage backends.
///
/// Every orchestrator operation reads the manifest fresh through this trait;
/// nothing is cached between calls.
#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Loads the manifest.
    ///
    /// Fails with `ManifestError::Missing` when no manifest exists.
    async fn load(&self) -> Result<Manifest>;

    /// Saves the whole manifest, replacing any previous version.
    async fn save(&self, manifest: &Manifest) -> Result<()>;

    /// Checks if a manifest exists.
    async fn exists(&self) -> Result<bool>;

    /// Where the manifest lives, for messages.
    fn location(&self) -> &Path;
}
