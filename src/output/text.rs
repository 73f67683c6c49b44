//! Text output formatter for human-readable display
//!
//! Prints the report messages one per line, highlighting available updates,
//! downgrade refusals and installer outcomes.

use crate::orchestrator::{InstallStatus, OrchestratorResult};
use crate::output::{error_chain, install_message, OutputFormatter, FAILURE_HEADLINE, TRACE_HINT};
use colored::Colorize;
use std::io::Write;

/// Kind of a report line, used to pick its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// An update is available or being applied
    Update,
    /// The update was not applied and the user may need to act
    Warning,
    /// Command the user can copy
    Command,
    Plain,
}

impl LineKind {
    fn classify(message: &str) -> Self {
        if message.starts_with('\t') {
            LineKind::Command
        } else if message.starts_with("A new ") || message.starts_with("Updating from:") {
            LineKind::Update
        } else if message.starts_with("Not updating")
            || message.starts_with("Unable to compare")
            || message.contains("is higher than the latest")
        {
            LineKind::Warning
        } else {
            LineKind::Plain
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Whether to use colors
    color: bool,
    /// Whether failures carry their full cause chain
    trace: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color control
    pub fn with_color(color: bool, trace: bool) -> Self {
        Self { color, trace }
    }

    fn style(&self, message: &str) -> String {
        if !self.color {
            return message.to_string();
        }
        match LineKind::classify(message) {
            LineKind::Update => message.green().to_string(),
            LineKind::Warning => message.yellow().to_string(),
            LineKind::Command => message.bold().to_string(),
            LineKind::Plain => message.to_string(),
        }
    }

    fn style_install(&self, status: &InstallStatus) -> String {
        let message = install_message(status);
        if !self.color {
            return message;
        }
        match status {
            InstallStatus::Failed(_) => message.red().bold().to_string(),
            _ => message.green().bold().to_string(),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        for message in &result.messages {
            writeln!(writer, "{}", self.style(message))?;
        }

        if let Some(status) = &result.install {
            writeln!(writer, "{}", self.style_install(status))?;
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", FAILURE_HEADLINE.red().bold())?;
        } else {
            writeln!(writer, "{}", FAILURE_HEADLINE)?;
        }

        let chain = error_chain(error);
        if self.trace {
            for (depth, cause) in chain.iter().enumerate() {
                if depth == 0 {
                    writeln!(writer, "Error: {}", cause)?;
                } else {
                    writeln!(writer, "  caused by: {}", cause)?;
                }
            }
        } else {
            if let Some(first) = chain.first() {
                writeln!(writer, "Error: {}", first)?;
            }
            writeln!(writer, "{}", TRACE_HINT)?;
        }

        Ok(())
    }
}
