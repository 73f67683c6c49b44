//! Update decision result types

use super::{ArtifactCoordinate, Channel};
use serde::Serialize;
use std::fmt;

/// Machine-readable reason behind a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// No candidate could be resolved for the channel
    Unavailable,
    /// The local binary already matches the candidate's checksum
    AlreadyCurrent,
    /// The candidate has a higher `major.minor.patch`
    NewerVersion,
    /// Same triple, but the candidate snapshot ordinal is higher
    NewerSnapshotBuild,
    /// The candidate is not newer than the current version
    NotNewer,
    /// The current or candidate version could not be parsed
    InvalidVersion,
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictReason::Unavailable => write!(f, "unavailable"),
            VerdictReason::AlreadyCurrent => write!(f, "already current"),
            VerdictReason::NewerVersion => write!(f, "newer version"),
            VerdictReason::NewerSnapshotBuild => write!(f, "newer snapshot build"),
            VerdictReason::NotNewer => write!(f, "not newer"),
            VerdictReason::InvalidVersion => write!(f, "invalid version"),
        }
    }
}

/// The engine's decision for one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateVerdict {
    pub channel: Channel,
    pub current_version: String,
    /// Resolved candidate version, if any
    pub candidate_version: Option<String>,
    pub should_update: bool,
    pub reason: VerdictReason,
    /// Resolved artifact, present whenever a candidate was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<ArtifactCoordinate>,
    /// Human-readable detail for unavailable or invalid candidates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl UpdateVerdict {
    /// Verdict for a channel without a usable candidate
    pub fn unavailable(
        channel: Channel,
        current_version: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            current_version: current_version.into(),
            candidate_version: None,
            should_update: false,
            reason: VerdictReason::Unavailable,
            coordinate: None,
            detail: Some(detail.into()),
        }
    }

    /// Verdict for a resolved candidate
    pub fn resolved(
        current_version: impl Into<String>,
        coordinate: ArtifactCoordinate,
        should_update: bool,
        reason: VerdictReason,
    ) -> Self {
        Self {
            channel: coordinate.channel,
            current_version: current_version.into(),
            candidate_version: Some(coordinate.resolved_version.to_string()),
            should_update,
            reason,
            coordinate: Some(coordinate),
            detail: None,
        }
    }

    /// Attach a human-readable detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Download URL of the candidate, if resolved
    pub fn download_url(&self) -> Option<&str> {
        self.coordinate.as_ref().map(|c| c.download_url.as_str())
    }
}
