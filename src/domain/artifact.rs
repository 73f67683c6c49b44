//! Fully resolved artifact coordinates

use super::{Channel, SnapshotQualifier, Version};
use crate::error::VersionError;
use serde::Serialize;

/// Binary and checksum URLs for one concrete version on one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactCoordinate {
    /// Channel the coordinate was resolved on
    pub channel: Channel,
    /// Repository base URL, always ending in `/`
    pub channel_base_url: String,
    /// Version as listed in the index (the artifact directory)
    pub index_version: String,
    /// Resolved version embedded in the artifact file name
    pub resolved_version: Version,
    /// URL of the artifact binary
    pub download_url: String,
    /// URL of the `.md5` sidecar
    pub md5_url: String,
}

impl ArtifactCoordinate {
    /// Build the coordinate for `{artifact_id}-{resolved_version}.jar`
    ///
    /// Fails when `resolved_version` is a bare snapshot label, which cannot
    /// name a downloadable file.
    pub fn new(
        channel: Channel,
        base_url: &str,
        index_version: &str,
        resolved_version: Version,
        artifact_id: &str,
    ) -> Result<Self, VersionError> {
        if resolved_version.qualifier() == Some(&SnapshotQualifier::Label) {
            return Err(VersionError::malformed(resolved_version.as_str()));
        }

        let channel_base_url = normalize_base_url(base_url);
        let download_url = format!(
            "{}{}/{}-{}.jar",
            channel_base_url,
            index_version,
            artifact_id,
            resolved_version.as_str()
        );
        let md5_url = format!("{}.md5", download_url);

        Ok(Self {
            channel,
            channel_base_url,
            index_version: index_version.to_string(),
            resolved_version,
            download_url,
            md5_url,
        })
    }
}

/// Ensure a repository base URL ends with a single `/`
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}
