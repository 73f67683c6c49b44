//! Output formatting for update reports
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::error::InstallError;
use crate::orchestrator::{InstallStatus, OrchestratorResult};
use std::io::{IsTerminal, Write};

/// First line of every failure diagnostic
pub const FAILURE_HEADLINE: &str = "Could not determine if blade update is available.";

/// Hint shown when `--trace` was not given
pub const TRACE_HINT: &str = "For more information run update with '--trace' option.";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Whether to use colors (when supported)
    pub color: bool,
    /// Whether failures carry their full cause chain
    pub trace: bool,
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, trace: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            color: std::io::stdout().is_terminal(),
            trace,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the orchestrator result
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write a failure that stopped the update check
    fn format_error(&self, error: &anyhow::Error, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Whether failures belong on stdout rather than stderr
    fn errors_to_stdout(&self) -> bool {
        false
    }
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.color, config.trace)),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.trace)),
    }
}

/// User-facing line describing an installer outcome
pub fn install_message(status: &InstallStatus) -> String {
    match status {
        InstallStatus::Completed => "Update completed successfully.".to_string(),
        InstallStatus::Launched { script } => format!(
            "Installer started: {}. The update finishes after blade exits.",
            script.display()
        ),
        InstallStatus::Failed(InstallError::ExitStatus { code, .. }) => {
            format!("blade exited with code: {}", code)
        }
        InstallStatus::Failed(e) => format!("Problem running the installer: {}", e),
    }
}

/// Messages of every error in the chain, outermost first
pub fn error_chain(error: &anyhow::Error) -> Vec<String> {
    error.chain().map(|cause| cause.to_string()).collect()
}
