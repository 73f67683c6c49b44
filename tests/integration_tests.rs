//! Integration tests for bladeup
//!
//! These tests verify:
//! - Channel resolution against a Maven-layout repository over HTTP
//! - Update decisions including the integrity check
//! - The full update workflow with a recording installer

use bladeup::domain::{Channel, VerdictReason};
use bladeup::error::{InstallError, RegistryError};
use bladeup::installer::{InstallOutcome, Installer};
use bladeup::integrity::{file_md5, IntegrityVerifier};
use bladeup::registry::{Fetcher, HttpClient, RepositoryClient};
use bladeup::update::{ChannelUrls, UpdateEngine, UpdateRequest};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTIFACT_ID: &str = "com.liferay.blade.cli";

/// Artifact index listing `versions` in document order
fn index_xml(versions: &[&str]) -> String {
    let entries: String = versions
        .iter()
        .map(|v| format!("      <version>{}</version>\n", v))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>com.liferay.blade</groupId>
  <artifactId>com.liferay.blade.cli</artifactId>
  <versioning>
    <versions>
{}    </versions>
    <lastUpdated>20190717214535</lastUpdated>
  </versioning>
</metadata>
"#,
        entries
    )
}

/// Per-version snapshot index resolving to `value`
fn snapshot_xml(value: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata modelVersion="1.1.0">
  <versioning>
    <snapshot>
      <timestamp>20190717.214535</timestamp>
      <buildNumber>5</buildNumber>
    </snapshot>
    <snapshotVersions>
      <snapshotVersion>
        <classifier>sources</classifier>
        <extension>jar</extension>
        <value>{value}</value>
      </snapshotVersion>
      <snapshotVersion>
        <extension>jar</extension>
        <value>{value}</value>
      </snapshotVersion>
      <snapshotVersion>
        <extension>pom</extension>
        <value>{value}</value>
      </snapshotVersion>
    </snapshotVersions>
  </versioning>
</metadata>
"#
    )
}

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(HttpClient::new().unwrap())
}

fn channel_urls(server: &MockServer) -> ChannelUrls {
    ChannelUrls {
        releases: format!("{}/releases/", server.uri()),
        snapshots: format!("{}/snapshots/", server.uri()),
    }
}

fn engine(server: &MockServer, local_binary: &Path) -> UpdateEngine {
    let fetcher = fetcher();
    UpdateEngine::new(
        RepositoryClient::new(fetcher.clone(), ARTIFACT_ID),
        IntegrityVerifier::new(fetcher),
        channel_urls(server),
        local_binary,
    )
}

mod resolution {
    use super::*;

    #[tokio::test]
    async fn test_release_resolution() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/releases/maven-metadata.xml",
            index_xml(&["3.8.0", "3.9.0", "3.9.2"]),
        )
        .await;

        let repository = RepositoryClient::new(fetcher(), ARTIFACT_ID);
        let coordinate = repository
            .resolve_latest(Channel::Release, &format!("{}/releases", server.uri()))
            .await
            .unwrap();

        assert_eq!(coordinate.resolved_version.as_str(), "3.9.2");
        assert_eq!(
            coordinate.download_url,
            format!(
                "{}/releases/3.9.2/com.liferay.blade.cli-3.9.2.jar",
                server.uri()
            )
        );
        assert_eq!(coordinate.md5_url, format!("{}.md5", coordinate.download_url));
    }

    #[tokio::test]
    async fn test_snapshot_resolution_uses_second_index() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/snapshots/maven-metadata.xml",
            index_xml(&["3.9.1-SNAPSHOT", "3.9.2-SNAPSHOT"]),
        )
        .await;
        serve(
            &server,
            "/snapshots/3.9.2-SNAPSHOT/maven-metadata.xml",
            snapshot_xml("3.9.2-20190717.214535-5"),
        )
        .await;

        let repository = RepositoryClient::new(fetcher(), ARTIFACT_ID);
        let coordinate = repository
            .resolve_latest(Channel::Snapshot, &format!("{}/snapshots/", server.uri()))
            .await
            .unwrap();

        assert_eq!(coordinate.index_version, "3.9.2-SNAPSHOT");
        assert_eq!(coordinate.resolved_version.snapshot_ordinal(), Some(201907172145));
        assert_eq!(
            coordinate.download_url,
            format!(
                "{}/snapshots/3.9.2-SNAPSHOT/com.liferay.blade.cli-3.9.2-20190717.214535-5.jar",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn test_document_order_wins() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/releases/maven-metadata.xml",
            index_xml(&["3.9.2", "3.10.0", "3.9.3"]),
        )
        .await;

        let repository = RepositoryClient::new(fetcher(), ARTIFACT_ID);
        let coordinate = repository
            .resolve_latest(Channel::Release, &format!("{}/releases/", server.uri()))
            .await
            .unwrap();

        assert_eq!(coordinate.resolved_version.as_str(), "3.9.3");
    }

    #[tokio::test]
    async fn test_missing_index_is_unreachable() {
        let server = MockServer::start().await;

        let repository = RepositoryClient::new(fetcher(), ARTIFACT_ID);
        let err = repository
            .resolve_latest(Channel::Release, &format!("{}/releases/", server.uri()))
            .await
            .unwrap_err();

        match err {
            RegistryError::Unreachable { message, .. } => assert!(message.contains("404")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_index_is_parse_error() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/releases/maven-metadata.xml",
            "<html><body>maintenance".to_string(),
        )
        .await;

        let repository = RepositoryClient::new(fetcher(), ARTIFACT_ID);
        let err = repository
            .resolve_latest(Channel::Release, &format!("{}/releases/", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::MetadataParse { .. }));
    }
}

mod decisions {
    use super::*;

    #[tokio::test]
    async fn test_newer_release_available() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/releases/maven-metadata.xml",
            index_xml(&["3.9.0", "3.9.2"]),
        )
        .await;
        serve(&server, "/snapshots/maven-metadata.xml", index_xml(&[])).await;

        let engine = engine(&server, Path::new("/nonexistent/blade.jar"));
        let report = engine
            .evaluate(&UpdateRequest {
                current_version: "3.9.0".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(report.active_channel, Channel::Release);
        assert!(report.release.should_update);
        assert_eq!(report.release.reason, VerdictReason::NewerVersion);
        assert_eq!(report.snapshot.reason, VerdictReason::Unavailable);
    }

    #[tokio::test]
    async fn test_matching_checksum_is_already_current() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("blade.jar");
        std::fs::write(&jar, b"blade 3.9.2 build").unwrap();
        let digest = file_md5(&jar).unwrap();

        let server = MockServer::start().await;
        serve(&server, "/releases/maven-metadata.xml", index_xml(&["3.9.2"])).await;
        serve(
            &server,
            "/releases/3.9.2/com.liferay.blade.cli-3.9.2.jar.md5",
            format!("{}  com.liferay.blade.cli-3.9.2.jar\n", digest.to_uppercase()),
        )
        .await;
        serve(&server, "/snapshots/maven-metadata.xml", index_xml(&[])).await;

        // Local version text says older, but the bytes are the published artifact
        let engine = engine(&server, &jar);
        let report = engine
            .evaluate(&UpdateRequest {
                current_version: "3.9.0".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!report.release.should_update);
        assert_eq!(report.release.reason, VerdictReason::AlreadyCurrent);
    }

    #[tokio::test]
    async fn test_newer_snapshot_build() {
        let server = MockServer::start().await;
        serve(&server, "/releases/maven-metadata.xml", index_xml(&["3.9.1"])).await;
        serve(
            &server,
            "/snapshots/maven-metadata.xml",
            index_xml(&["3.9.2-SNAPSHOT"]),
        )
        .await;
        serve(
            &server,
            "/snapshots/3.9.2-SNAPSHOT/maven-metadata.xml",
            snapshot_xml("3.9.2-20190718.101010-6"),
        )
        .await;

        let engine = engine(&server, Path::new("/nonexistent/blade.jar"));
        let report = engine
            .evaluate(&UpdateRequest {
                current_version: "3.9.2.SNAPSHOT201907172145".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(report.active_channel, Channel::Snapshot);
        assert!(report.snapshot.should_update);
        assert_eq!(report.snapshot.reason, VerdictReason::NewerSnapshotBuild);
        assert!(!report.release.should_update);
    }

    #[tokio::test]
    async fn test_same_snapshot_build_not_newer() {
        let server = MockServer::start().await;
        serve(&server, "/releases/maven-metadata.xml", index_xml(&["3.9.1"])).await;
        serve(
            &server,
            "/snapshots/maven-metadata.xml",
            index_xml(&["3.9.2-SNAPSHOT"]),
        )
        .await;
        serve(
            &server,
            "/snapshots/3.9.2-SNAPSHOT/maven-metadata.xml",
            snapshot_xml("3.9.2-20190717.214535-5"),
        )
        .await;

        let engine = engine(&server, Path::new("/nonexistent/blade.jar"));
        let report = engine
            .evaluate(&UpdateRequest {
                current_version: "3.9.2.SNAPSHOT201907172145".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!report.snapshot.should_update);
        assert_eq!(
            report.plan("jpm install -f").messages,
            vec!["Current blade version 3.9.2.SNAPSHOT201907172145 is the latest snapshot version."]
        );
    }

    #[tokio::test]
    async fn test_server_error_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases/maven-metadata.xml"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let engine = engine(&server, Path::new("/nonexistent/blade.jar"));
        let err = engine
            .evaluate(&UpdateRequest {
                current_version: "3.9.0".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::Unreachable { .. }));
    }
}

mod workflow {
    use super::*;
    use bladeup::cli::CliArgs;
    use bladeup::config::Settings;
    use bladeup::orchestrator::{InstallStatus, Orchestrator};
    use clap::Parser;
    use std::sync::Mutex;

    struct RecordingInstaller {
        applied: Arc<Mutex<Vec<String>>>,
    }

    impl Installer for RecordingInstaller {
        fn apply(&self, download_url: &str) -> Result<InstallOutcome, InstallError> {
            self.applied.lock().unwrap().push(download_url.to_string());
            Ok(InstallOutcome::Completed)
        }
    }

    fn settings(server: &MockServer) -> Settings {
        let urls = channel_urls(server);
        Settings {
            releases_url: urls.releases,
            snapshots_url: urls.snapshots,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_update_installs_latest_release() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/releases/maven-metadata.xml",
            index_xml(&["3.9.0", "3.9.2"]),
        )
        .await;
        serve(&server, "/snapshots/maven-metadata.xml", index_xml(&[])).await;

        let applied = Arc::new(Mutex::new(Vec::new()));
        let args = CliArgs::parse_from([
            "bladeup",
            "--current-version",
            "3.9.0",
            "--binary",
            "/nonexistent/blade.jar",
        ]);
        let orchestrator = Orchestrator::with_parts(
            args,
            settings(&server),
            fetcher(),
            Box::new(RecordingInstaller {
                applied: applied.clone(),
            }),
        );

        let result = orchestrator.run_with_progress(false).await.unwrap();
        let expected = format!(
            "{}/releases/3.9.2/com.liferay.blade.cli-3.9.2.jar",
            server.uri()
        );

        assert!(matches!(result.install, Some(InstallStatus::Completed)));
        assert_eq!(result.messages, vec![format!("Updating from: {}", expected)]);
        assert_eq!(applied.lock().unwrap().as_slice(), [expected]);
    }

    #[tokio::test]
    async fn test_downgrade_is_refused() {
        let server = MockServer::start().await;
        serve(&server, "/releases/maven-metadata.xml", index_xml(&["3.9.0"])).await;
        serve(&server, "/snapshots/maven-metadata.xml", index_xml(&[])).await;

        let applied = Arc::new(Mutex::new(Vec::new()));
        let args = CliArgs::parse_from([
            "bladeup",
            "--current-version",
            "4.0.0",
            "--binary",
            "/nonexistent/blade.jar",
        ]);
        let orchestrator = Orchestrator::with_parts(
            args,
            settings(&server),
            fetcher(),
            Box::new(RecordingInstaller {
                applied: applied.clone(),
            }),
        );

        let result = orchestrator.run_with_progress(false).await.unwrap();

        assert!(result.install.is_none());
        assert!(applied.lock().unwrap().is_empty());
        assert!(result.messages.iter().any(|m| m.contains("downgrades are not supported")));
        assert!(result.messages.contains(&format!(
            "\tjpm install -f {}/releases/3.9.0/com.liferay.blade.cli-3.9.0.jar",
            server.uri()
        )));
    }
}
