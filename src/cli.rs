//! CLI argument parsing module for bladeup

use clap::Parser;
use std::path::PathBuf;

/// Update blade to the latest release or snapshot build
#[derive(Parser, Debug, Clone)]
#[command(name = "bladeup", version, about = "Update blade to the latest version")]
pub struct CliArgs {
    /// Only report whether updates are available
    #[arg(short, long)]
    pub check_only: bool,

    /// Update to the latest released version
    #[arg(short, long)]
    pub release: bool,

    /// Update to the latest snapshot build
    #[arg(short, long)]
    pub snapshots: bool,

    /// Repository base URL to update from, replacing the channel defaults
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Print detailed diagnostics and full error traces
    #[arg(long)]
    pub trace: bool,

    /// Output the update report as JSON
    #[arg(long)]
    pub json: bool,

    /// Working directory for the installer
    #[arg(short, long, default_value = ".")]
    pub base: PathBuf,

    /// Version of the installed blade build
    #[arg(long, env = "BLADE_VERSION", hide = true)]
    pub current_version: Option<String>,

    /// Path of the installed blade binary used for checksum comparison
    #[arg(long, env = "BLADE_JAR", hide = true)]
    pub binary: Option<PathBuf>,

    /// Directory holding update.url and update.toml (default: ~/.blade)
    #[arg(long, env = "BLADE_CONFIG_DIR", hide = true)]
    pub config_dir: Option<PathBuf>,
}

impl CliArgs {
    /// Version of the running build
    pub fn current_version(&self) -> String {
        self.current_version
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    }
}
