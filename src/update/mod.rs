//! Update decision engine
//!
//! This module provides:
//! - The per-channel judgment: resolve → checksum → version → snapshot ordinal
//! - The engine evaluating both channels for one invocation
//! - The report rendering verdicts into user-facing messages

mod report;

pub use report::{Plan, UpdateReport};

use crate::domain::{ArtifactCoordinate, Channel, UpdateVerdict, VerdictReason, Version};
use crate::error::{RegistryError, VersionError};
use crate::integrity::IntegrityVerifier;
use crate::registry::RepositoryClient;
use std::cmp::Ordering;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Inputs of one resolution pass
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Version string of the running tool
    pub current_version: String,
    /// Explicit `--release`
    pub release: bool,
    /// Explicit `--snapshots`
    pub snapshots: bool,
    /// Repository base URL replacing both channel defaults
    pub override_url: Option<String>,
}

impl UpdateRequest {
    /// The channel whose verdict governs the update
    pub fn active_channel(&self) -> Channel {
        Channel::select(self.release, self.snapshots, &self.current_version)
    }
}

/// Where each channel's repository lives
#[derive(Debug, Clone)]
pub struct ChannelUrls {
    pub releases: String,
    pub snapshots: String,
}

impl ChannelUrls {
    pub fn for_channel(&self, channel: Channel) -> &str {
        match channel {
            Channel::Release => &self.releases,
            Channel::Snapshot => &self.snapshots,
        }
    }
}

/// Decision engine combining resolution, integrity and version ordering
pub struct UpdateEngine {
    repository: RepositoryClient,
    verifier: IntegrityVerifier,
    urls: ChannelUrls,
    local_binary: PathBuf,
}

impl UpdateEngine {
    pub fn new(
        repository: RepositoryClient,
        verifier: IntegrityVerifier,
        urls: ChannelUrls,
        local_binary: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            verifier,
            urls,
            local_binary: local_binary.into(),
        }
    }

    /// Evaluate both channels, one after the other
    ///
    /// Only transport and metadata failures abort the pass; a channel with
    /// nothing to offer or an unparseable version yields a verdict instead.
    pub async fn evaluate(&self, request: &UpdateRequest) -> Result<UpdateReport, RegistryError> {
        let current = Version::parse(&request.current_version);
        if let Err(e) = &current {
            warn!(error = %e, "current version is not comparable");
        }

        let release = self
            .evaluate_channel(Channel::Release, request, &current)
            .await?;
        let snapshot = self
            .evaluate_channel(Channel::Snapshot, request, &current)
            .await?;

        Ok(UpdateReport::new(request, release, snapshot))
    }

    async fn evaluate_channel(
        &self,
        channel: Channel,
        request: &UpdateRequest,
        current: &Result<Version, VersionError>,
    ) -> Result<UpdateVerdict, RegistryError> {
        let base_url = request
            .override_url
            .as_deref()
            .unwrap_or_else(|| self.urls.for_channel(channel));

        let coordinate = match self.repository.resolve_latest(channel, base_url).await {
            Ok(coordinate) => coordinate,
            Err(e @ RegistryError::NotFound { .. }) => {
                debug!(%channel, error = %e, "no candidate");
                return Ok(UpdateVerdict::unavailable(
                    channel,
                    &request.current_version,
                    e.to_string(),
                ));
            }
            Err(RegistryError::InvalidVersion { source, .. }) => {
                return Ok(UpdateVerdict {
                    reason: VerdictReason::InvalidVersion,
                    ..UpdateVerdict::unavailable(
                        channel,
                        &request.current_version,
                        source.to_string(),
                    )
                });
            }
            Err(e) => return Err(e),
        };

        let checksum_matches = self
            .verifier
            .matches(&self.local_binary, &coordinate.md5_url)
            .await;

        let verdict = judge(&request.current_version, current, coordinate, checksum_matches);
        debug!(%channel, should_update = verdict.should_update, reason = %verdict.reason, "verdict");
        Ok(verdict)
    }
}

/// Decide whether `coordinate` should replace the current build
pub fn judge(
    current_text: &str,
    current: &Result<Version, VersionError>,
    coordinate: ArtifactCoordinate,
    checksum_matches: bool,
) -> UpdateVerdict {
    if checksum_matches {
        return UpdateVerdict::resolved(current_text, coordinate, false, VerdictReason::AlreadyCurrent);
    }

    let current = match current {
        Ok(current) => current,
        Err(e) => {
            return UpdateVerdict::resolved(
                current_text,
                coordinate,
                false,
                VerdictReason::InvalidVersion,
            )
            .with_detail(e.to_string());
        }
    };

    let candidate = &coordinate.resolved_version;
    let ordering = candidate.compare(current);
    if ordering == Ordering::Greater {
        return UpdateVerdict::resolved(current_text, coordinate, true, VerdictReason::NewerVersion);
    }

    // Ordinals only break ties; a lower triple is never installed
    if ordering == Ordering::Equal && coordinate.channel == Channel::Snapshot {
        if let (Some(candidate_ordinal), Some(current_ordinal)) =
            (candidate.snapshot_ordinal(), current.snapshot_ordinal())
        {
            if candidate_ordinal > current_ordinal {
                return UpdateVerdict::resolved(
                    current_text,
                    coordinate,
                    true,
                    VerdictReason::NewerSnapshotBuild,
                );
            }
        }
    }

    UpdateVerdict::resolved(current_text, coordinate, false, VerdictReason::NotNewer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::{index_xml, snapshot_xml, StaticFetcher};
    use std::io::Write;
    use std::sync::Arc;

    const RELEASES: &str = "https://repo.test/releases/";
    const SNAPSHOTS: &str = "https://repo.test/snapshots/";
    const ARTIFACT: &str = "com.liferay.blade.cli";

    fn coordinate(channel: Channel, index: &str, resolved: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::new(
            channel,
            RELEASES,
            index,
            Version::parse(resolved).unwrap(),
            ARTIFACT,
        )
        .unwrap()
    }

    fn judge_str(current: &str, coord: ArtifactCoordinate, matches: bool) -> UpdateVerdict {
        judge(current, &Version::parse(current), coord, matches)
    }

    #[test]
    fn test_judge_already_current_by_checksum() {
        let verdict = judge_str("1.2.0", coordinate(Channel::Release, "1.2.0", "1.2.0"), true);
        assert!(!verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::AlreadyCurrent);
    }

    #[test]
    fn test_judge_checksum_wins_over_version() {
        // Version strings diverge but the binary is identical
        let verdict = judge_str("1.2.0", coordinate(Channel::Release, "1.3.0", "1.3.0"), true);
        assert_eq!(verdict.reason, VerdictReason::AlreadyCurrent);
    }

    #[test]
    fn test_judge_newer_version() {
        let verdict = judge_str("1.2.0", coordinate(Channel::Release, "1.3.0", "1.3.0"), false);
        assert!(verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::NewerVersion);
        assert_eq!(verdict.candidate_version.as_deref(), Some("1.3.0"));
    }

    #[test]
    fn test_judge_newer_snapshot_build() {
        let coord = coordinate(Channel::Snapshot, "2.0.0-SNAPSHOT", "2.0.0-0.000700-1");
        assert_eq!(coord.resolved_version.snapshot_ordinal(), Some(7));

        let verdict = judge_str("2.0.0.SNAPSHOT5", coord, false);
        assert!(verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::NewerSnapshotBuild);
    }

    #[test]
    fn test_judge_lower_snapshot_with_newer_ordinal_is_not_installed() {
        let coord = coordinate(Channel::Snapshot, "2.9.0-SNAPSHOT", "2.9.0-20190718.101010-6");
        let verdict = judge_str("3.0.0.SNAPSHOT201907172145", coord, false);
        assert!(!verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::NotNewer);
    }

    #[test]
    fn test_judge_same_snapshot_build() {
        let coord = coordinate(Channel::Snapshot, "2.0.0-SNAPSHOT", "2.0.0-0.000500-1");
        let verdict = judge_str("2.0.0.SNAPSHOT5", coord.clone(), false);
        assert!(!verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::NotNewer);

        let current = Version::parse("2.0.0.SNAPSHOT5").unwrap();
        assert!(current.is_equivalent(&coord.resolved_version));
    }

    #[test]
    fn test_judge_ordinal_ignored_on_release_channel() {
        let coord = coordinate(Channel::Release, "2.0.0-SNAPSHOT", "2.0.0-0.000700-1");
        let verdict = judge_str("2.0.0.SNAPSHOT5", coord, false);
        assert!(!verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::NotNewer);
    }

    #[test]
    fn test_judge_downgrade_not_applied() {
        let verdict = judge_str("3.0.0", coordinate(Channel::Release, "2.9.0", "2.9.0"), false);
        assert!(!verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::NotNewer);
    }

    #[test]
    fn test_judge_invalid_current_version() {
        let verdict = judge_str("unknown", coordinate(Channel::Release, "1.3.0", "1.3.0"), false);
        assert!(!verdict.should_update);
        assert_eq!(verdict.reason, VerdictReason::InvalidVersion);
        assert!(verdict.detail.unwrap().contains("unknown"));
    }

    fn engine(fetcher: StaticFetcher, binary: &std::path::Path) -> UpdateEngine {
        let fetcher = Arc::new(fetcher);
        UpdateEngine::new(
            RepositoryClient::new(fetcher.clone(), ARTIFACT),
            IntegrityVerifier::new(fetcher),
            ChannelUrls {
                releases: RELEASES.to_string(),
                snapshots: SNAPSHOTS.to_string(),
            },
            binary,
        )
    }

    fn repository() -> StaticFetcher {
        StaticFetcher::new()
            .with(
                format!("{}maven-metadata.xml", RELEASES),
                index_xml(&["1.0.0", "1.2.0", "1.3.0"]),
            )
            .with(
                format!("{}maven-metadata.xml", SNAPSHOTS),
                index_xml(&["1.3.1-SNAPSHOT"]),
            )
            .with(
                format!("{}1.3.1-SNAPSHOT/maven-metadata.xml", SNAPSHOTS),
                snapshot_xml("1.3.1-20240102.030405-9"),
            )
    }

    #[tokio::test]
    async fn test_engine_evaluates_both_channels() {
        let engine = engine(repository(), std::path::Path::new("/nonexistent/blade.jar"));
        let request = UpdateRequest {
            current_version: "1.2.0".to_string(),
            ..Default::default()
        };

        let report = engine.evaluate(&request).await.unwrap();
        assert_eq!(report.active_channel, Channel::Release);
        assert_eq!(report.release.reason, VerdictReason::NewerVersion);
        assert_eq!(report.snapshot.reason, VerdictReason::NewerVersion);
        assert_eq!(
            report.snapshot.candidate_version.as_deref(),
            Some("1.3.1-20240102.030405-9")
        );
    }

    #[tokio::test]
    async fn test_engine_already_current_by_checksum() {
        let mut binary = tempfile::NamedTempFile::new().unwrap();
        binary.write_all(b"blade 1.3.0").unwrap();
        binary.flush().unwrap();
        let digest = format!("{:x}", md5::compute(b"blade 1.3.0"));

        let fetcher = repository().with(
            format!("{}1.3.0/{}-1.3.0.jar.md5", RELEASES, ARTIFACT),
            digest,
        );
        let engine = engine(fetcher, binary.path());
        let request = UpdateRequest {
            current_version: "1.2.0".to_string(),
            ..Default::default()
        };

        let report = engine.evaluate(&request).await.unwrap();
        assert_eq!(report.release.reason, VerdictReason::AlreadyCurrent);
        assert!(!report.active().should_update);
    }

    #[tokio::test]
    async fn test_engine_unavailable_channel() {
        let fetcher = StaticFetcher::new()
            .with(
                format!("{}maven-metadata.xml", RELEASES),
                index_xml(&["1.0.0"]),
            )
            .with(
                format!("{}maven-metadata.xml", SNAPSHOTS),
                index_xml(&["1.0.0"]),
            );
        let engine = engine(fetcher, std::path::Path::new("/nonexistent"));
        let request = UpdateRequest {
            current_version: "1.0.0".to_string(),
            ..Default::default()
        };

        let report = engine.evaluate(&request).await.unwrap();
        assert_eq!(report.snapshot.reason, VerdictReason::Unavailable);
        assert_eq!(report.release.reason, VerdictReason::NotNewer);
    }

    #[tokio::test]
    async fn test_engine_override_url_used_for_both_channels() {
        let custom = "https://mirror.test/blade/";
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with(
                    format!("{}maven-metadata.xml", custom),
                    index_xml(&["1.4.0", "1.5.0-SNAPSHOT"]),
                )
                .with(
                    format!("{}1.5.0-SNAPSHOT/maven-metadata.xml", custom),
                    snapshot_xml("1.5.0-20240102.030405-1"),
                ),
        );
        let engine = UpdateEngine::new(
            RepositoryClient::new(fetcher.clone(), ARTIFACT),
            IntegrityVerifier::new(fetcher.clone()),
            ChannelUrls {
                releases: RELEASES.to_string(),
                snapshots: SNAPSHOTS.to_string(),
            },
            "/nonexistent",
        );
        let request = UpdateRequest {
            current_version: "1.2.0".to_string(),
            override_url: Some(custom.to_string()),
            ..Default::default()
        };

        let report = engine.evaluate(&request).await.unwrap();
        assert_eq!(report.release.candidate_version.as_deref(), Some("1.4.0"));
        assert!(fetcher
            .requests
            .lock()
            .unwrap()
            .iter()
            .all(|url| url.starts_with(custom)));
    }

    #[tokio::test]
    async fn test_engine_unreachable_aborts() {
        let engine = engine(StaticFetcher::new(), std::path::Path::new("/nonexistent"));
        let request = UpdateRequest {
            current_version: "1.0.0".to_string(),
            ..Default::default()
        };

        let err = engine.evaluate(&request).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_engine_invalid_candidate_version() {
        let fetcher = repository().with(
            format!("{}maven-metadata.xml", RELEASES),
            index_xml(&["1.0.0", "1.4.0-rc1"]),
        );
        let engine = engine(fetcher, std::path::Path::new("/nonexistent"));
        let request = UpdateRequest {
            current_version: "1.2.0".to_string(),
            ..Default::default()
        };

        let report = engine.evaluate(&request).await.unwrap();
        assert_eq!(report.release.reason, VerdictReason::InvalidVersion);
        assert!(!report.release.should_update);
    }

    #[test]
    fn test_active_channel() {
        let request = UpdateRequest {
            current_version: "3.9.2.SNAPSHOT201907172145".to_string(),
            ..Default::default()
        };
        assert_eq!(request.active_channel(), Channel::Snapshot);

        let request = UpdateRequest {
            current_version: "3.9.2.SNAPSHOT201907172145".to_string(),
            release: true,
            ..Default::default()
        };
        assert_eq!(request.active_channel(), Channel::Release);
    }
}
