//! Artifact repository access
//!
//! This module provides:
//! - HTTP client shared foundation
//! - `maven-metadata.xml` parsing
//! - A single resolver turning a channel and base URL into a complete
//!   [`ArtifactCoordinate`]

mod client;
mod metadata;

pub use client::{HttpClient, DEFAULT_USER_AGENT};
pub use metadata::{MavenMetadata, SnapshotVersion};

use crate::domain::{normalize_base_url, ArtifactCoordinate, Channel, Version};
use crate::error::RegistryError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the version index document under every repository path
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// Source of remote text documents
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the document at `url` as text
    async fn fetch_text(&self, url: &str) -> Result<String, RegistryError>;
}

/// Resolves the latest artifact of a channel from a Maven-layout repository
#[derive(Clone)]
pub struct RepositoryClient {
    fetcher: Arc<dyn Fetcher>,
    artifact_id: String,
}

impl RepositoryClient {
    /// Create a resolver for `artifact_id`
    pub fn new(fetcher: Arc<dyn Fetcher>, artifact_id: impl Into<String>) -> Self {
        Self {
            fetcher,
            artifact_id: artifact_id.into(),
        }
    }

    /// Resolve the latest version of `channel` under `base_url`
    ///
    /// The index is trusted to be sorted ascending: the last entry that
    /// belongs to the channel wins. Snapshot versions take a second fetch
    /// to find the timestamped build the artifact file is named after.
    pub async fn resolve_latest(
        &self,
        channel: Channel,
        base_url: &str,
    ) -> Result<ArtifactCoordinate, RegistryError> {
        let base_url = normalize_base_url(base_url);
        let index_url = format!("{}{}", base_url, METADATA_FILE);

        let index = self.fetch_metadata(&index_url).await?;
        let latest = index
            .versions
            .iter()
            .filter(|v| channel.accepts(v))
            .last()
            .cloned()
            .ok_or_else(|| RegistryError::not_found(&index_url, channel))?;

        debug!(%channel, %latest, candidates = index.versions.len(), "selected latest index entry");

        let resolved = match channel {
            Channel::Release => latest.clone(),
            Channel::Snapshot => {
                let snapshot_url = format!("{}{}/{}", base_url, latest, METADATA_FILE);
                let snapshot_index = self.fetch_metadata(&snapshot_url).await?;
                snapshot_index.snapshot_value(&latest).ok_or_else(|| {
                    RegistryError::metadata_parse(&snapshot_url, "no snapshotVersion value found")
                })?
            }
        };

        let version = Version::parse(&resolved)
            .map_err(|e| RegistryError::invalid_version(&index_url, e))?;
        let coordinate =
            ArtifactCoordinate::new(channel, &base_url, &latest, version, &self.artifact_id)
                .map_err(|e| RegistryError::invalid_version(&index_url, e))?;

        info!(%channel, version = %coordinate.resolved_version, url = %coordinate.download_url, "resolved artifact");

        Ok(coordinate)
    }

    async fn fetch_metadata(&self, url: &str) -> Result<MavenMetadata, RegistryError> {
        let body = self.fetcher.fetch_text(url).await?;
        MavenMetadata::parse(&body).map_err(|message| RegistryError::metadata_parse(url, message))
    }
}
