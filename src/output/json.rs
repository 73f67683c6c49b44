//! JSON output formatter for machine processing
//!
//! The report is emitted as a single pretty-printed object holding both
//! channel verdicts, the user-facing messages and the installer outcome.

use crate::error::InstallError;
use crate::orchestrator::{InstallStatus, OrchestratorResult};
use crate::output::{error_chain, install_message, OutputFormatter, FAILURE_HEADLINE};
use crate::update::UpdateReport;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Whether failures carry their full cause chain
    trace: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(trace: bool) -> Self {
        Self { trace }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    check_only: bool,
    #[serde(flatten)]
    report: &'a UpdateReport,
    messages: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    install: Option<JsonInstall>,
}

/// JSON representation of the installer outcome
#[derive(Serialize)]
struct JsonInstall {
    /// completed, launched or failed
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
}

impl From<&InstallStatus> for JsonInstall {
    fn from(status: &InstallStatus) -> Self {
        let message = install_message(status);
        match status {
            InstallStatus::Completed => JsonInstall {
                status: "completed",
                message,
                script: None,
                exit_code: None,
            },
            InstallStatus::Launched { script } => JsonInstall {
                status: "launched",
                message,
                script: Some(script.display().to_string()),
                exit_code: None,
            },
            InstallStatus::Failed(e) => JsonInstall {
                status: "failed",
                message,
                script: None,
                exit_code: match e {
                    InstallError::ExitStatus { code, .. } => Some(*code),
                    _ => None,
                },
            },
        }
    }
}

/// JSON representation of a failure
#[derive(Serialize)]
struct JsonError {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    causes: Vec<String>,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            check_only: result.check_only,
            report: &result.report,
            messages: &result.messages,
            install: result.install.as_ref().map(JsonInstall::from),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error, writer: &mut dyn Write) -> std::io::Result<()> {
        let mut chain = error_chain(error).into_iter();
        let output = JsonError {
            error: FAILURE_HEADLINE,
            message: chain.next().unwrap_or_default(),
            causes: if self.trace { chain.collect() } else { Vec::new() },
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn errors_to_stdout(&self) -> bool {
        true
    }
}
