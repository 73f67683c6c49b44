//! Update orchestrator for one CLI invocation
//!
//! This module provides:
//! - Workflow coordination: configure → resolve → judge → report → install
//! - Override URL precedence (`--url` over `update.url`)
//! - Check-only reporting of both channels

use crate::cli::CliArgs;
use crate::config::{validate_url, Settings};
use crate::error::{AppError, InstallError};
use crate::installer::{installer_for, HostFamily, InstallOutcome, Installer, INSTALL_COMMAND};
use crate::integrity::IntegrityVerifier;
use crate::progress::Progress;
use crate::registry::{Fetcher, HttpClient, RepositoryClient, DEFAULT_USER_AGENT};
use crate::update::{UpdateEngine, UpdateReport, UpdateRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Outcome of the installer, if one ran
#[derive(Debug)]
pub enum InstallStatus {
    /// The install command finished successfully
    Completed,
    /// The installer script was launched and completes after exit
    Launched { script: PathBuf },
    /// The installer failed; nothing was replaced
    Failed(InstallError),
}

impl InstallStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, InstallStatus::Failed(_))
    }
}

impl From<Result<InstallOutcome, InstallError>> for InstallStatus {
    fn from(result: Result<InstallOutcome, InstallError>) -> Self {
        match result {
            Ok(InstallOutcome::Completed) => InstallStatus::Completed,
            Ok(InstallOutcome::Launched { script }) => InstallStatus::Launched { script },
            Err(e) => InstallStatus::Failed(e),
        }
    }
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Verdicts for both channels
    pub report: UpdateReport,
    /// Whether this was a check-only run
    pub check_only: bool,
    /// Messages for the user, in order
    pub messages: Vec<String>,
    /// Installer outcome when an update was applied
    pub install: Option<InstallStatus>,
}

impl OrchestratorResult {
    /// True unless the installer failed
    pub fn is_success(&self) -> bool {
        !self.install.as_ref().is_some_and(InstallStatus::is_failure)
    }
}

/// Orchestrator for one update invocation
pub struct Orchestrator {
    args: CliArgs,
    settings: Settings,
    engine: UpdateEngine,
    installer: Box<dyn Installer>,
}

impl Orchestrator {
    /// Create an orchestrator from CLI arguments and the user configuration
    pub fn new(args: CliArgs) -> Result<Self, AppError> {
        let settings = match &args.config_dir {
            Some(dir) => Settings::load_from(dir)?,
            None => Settings::load()?,
        };
        let client = HttpClient::with_config(settings.timeout, DEFAULT_USER_AGENT)?;
        let installer = installer_for(HostFamily::current(), &args.base);

        Ok(Self::with_parts(args, settings, Arc::new(client), installer))
    }

    /// Create an orchestrator with explicit collaborators (for testing)
    pub fn with_parts(
        args: CliArgs,
        settings: Settings,
        fetcher: Arc<dyn Fetcher>,
        installer: Box<dyn Installer>,
    ) -> Self {
        let local_binary = args
            .binary
            .clone()
            .or_else(|| std::env::current_exe().ok())
            .unwrap_or_default();

        let engine = UpdateEngine::new(
            RepositoryClient::new(fetcher.clone(), settings.artifact_id.clone()),
            IntegrityVerifier::new(fetcher),
            settings.channel_urls(),
            local_binary,
        );

        Self {
            args,
            settings,
            engine,
            installer,
        }
    }

    /// Base URL replacing both channel repositories, if any
    fn override_url(&self) -> Result<Option<String>, AppError> {
        match &self.args.url {
            Some(url) => Ok(Some(validate_url(url)?)),
            None => Ok(self.settings.override_url.clone()),
        }
    }

    /// Run the update workflow
    pub async fn run(&self) -> Result<OrchestratorResult, AppError> {
        self.run_with_progress(!self.args.json).await
    }

    /// Run the update workflow with optional progress display
    pub async fn run_with_progress(
        &self,
        show_progress: bool,
    ) -> Result<OrchestratorResult, AppError> {
        let request = UpdateRequest {
            current_version: self.args.current_version(),
            release: self.args.release,
            snapshots: self.args.snapshots,
            override_url: self.override_url()?,
        };
        debug!(?request, "update request");

        let mut progress = Progress::new(show_progress);
        progress.spinner("Checking for blade updates...");
        let report = self.engine.evaluate(&request).await;
        progress.finish_and_clear();
        let report = report?;

        if self.args.check_only {
            return Ok(OrchestratorResult {
                messages: report.check_messages(),
                report,
                check_only: true,
                install: None,
            });
        }

        let plan = report.plan(INSTALL_COMMAND);
        let install = plan
            .install_url
            .as_deref()
            .map(|url| InstallStatus::from(self.installer.apply(url)));

        Ok(OrchestratorResult {
            report,
            check_only: false,
            messages: plan.messages,
            install,
        })
    }
}
