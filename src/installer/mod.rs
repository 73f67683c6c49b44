//! Platform installer integration for applying a resolved update
//!
//! This module provides:
//! - Host family detection (POSIX-like or Windows-like)
//! - A POSIX installer running the package install command in place
//! - A Windows installer writing a batch script and launching it detached,
//!   so the running binary can exit before it is replaced

use crate::error::InstallError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Package install command, followed by the artifact URL
pub const INSTALL_COMMAND: &str = "jpm install -f";

/// Batch template for Windows hosts
const WINDOWS_TEMPLATE: &str = include_str!("jpm_install.bat");

/// Placeholder in [`WINDOWS_TEMPLATE`] replaced by the download URL
const URL_PLACEHOLDER: &str = "{{DOWNLOAD_URL}}";

/// Operating system family of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFamily {
    Posix,
    Windows,
}

impl HostFamily {
    /// Family of the running host
    pub fn current() -> Self {
        if cfg!(windows) {
            HostFamily::Windows
        } else {
            HostFamily::Posix
        }
    }
}

/// Result of a successful installer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The install command finished with exit code 0
    Completed,
    /// The installer script was launched and finishes after this process exits
    Launched { script: PathBuf },
}

/// Trait for running external commands
pub trait ProcessRunner {
    /// Run a command to completion in `working_dir`, returning its exit code
    fn run(&self, command: &[String], working_dir: &Path) -> io::Result<i32>;

    /// Start a command without waiting for it
    fn spawn_detached(&self, command: &[String]) -> io::Result<()>;
}

/// Process runner executing real commands
#[derive(Debug, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(command: &[String]) -> io::Result<Command> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Empty command"))?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command: &[String], working_dir: &Path) -> io::Result<i32> {
        let status = Self::command(command)?.current_dir(working_dir).status()?;
        // A signal-terminated process has no code
        Ok(status.code().unwrap_or(-1))
    }

    fn spawn_detached(&self, command: &[String]) -> io::Result<()> {
        Self::command(command)?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
    }
}

/// Capability to replace the installed binary with a downloaded artifact
pub trait Installer {
    /// Apply the artifact at `download_url`; never retried
    fn apply(&self, download_url: &str) -> Result<InstallOutcome, InstallError>;
}

/// Runs the install command synchronously
pub struct PosixInstaller<R: ProcessRunner> {
    runner: R,
    working_dir: PathBuf,
}

impl<R: ProcessRunner> PosixInstaller<R> {
    pub fn new(runner: R, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            working_dir: working_dir.into(),
        }
    }
}

impl<R: ProcessRunner> Installer for PosixInstaller<R> {
    fn apply(&self, download_url: &str) -> Result<InstallOutcome, InstallError> {
        let command = install_command(download_url);
        let command_str = command.join(" ");
        debug!(command = %command_str, dir = %self.working_dir.display(), "running installer");

        let code = self
            .runner
            .run(&command, &self.working_dir)
            .map_err(|e| InstallError::spawn(&command_str, e.to_string()))?;

        if code == 0 {
            info!(command = %command_str, "installer finished");
            Ok(InstallOutcome::Completed)
        } else {
            Err(InstallError::exit_status(command_str, code))
        }
    }
}

/// Writes the batch installer and launches it detached
pub struct WindowsInstaller<R: ProcessRunner> {
    runner: R,
    script_dir: PathBuf,
}

impl<R: ProcessRunner> WindowsInstaller<R> {
    /// Scripts are written to the system temporary directory
    pub fn new(runner: R) -> Self {
        Self::with_script_dir(runner, std::env::temp_dir())
    }

    pub fn with_script_dir(runner: R, script_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            script_dir: script_dir.into(),
        }
    }

    fn write_script(&self, download_url: &str) -> Result<PathBuf, InstallError> {
        let contents = render_script(download_url);
        let script_error = |source: io::Error| InstallError::Script {
            path: self.script_dir.clone(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix("jpm_install")
            .suffix(".bat")
            .tempfile_in(&self.script_dir)
            .map_err(script_error)?;
        file.write_all(contents.as_bytes()).map_err(script_error)?;
        file.flush().map_err(script_error)?;

        // The script outlives this process; it deletes itself when done
        file.into_temp_path()
            .keep()
            .map_err(|e| script_error(e.error))
    }
}

impl<R: ProcessRunner> Installer for WindowsInstaller<R> {
    fn apply(&self, download_url: &str) -> Result<InstallOutcome, InstallError> {
        let script = self.write_script(download_url)?;
        let command = vec![
            "cmd".to_string(),
            "/c".to_string(),
            "start".to_string(),
            String::new(),
            script.display().to_string(),
        ];
        debug!(script = %script.display(), "launching installer script");

        if let Err(e) = self.runner.spawn_detached(&command) {
            let _ = fs::remove_file(&script);
            return Err(InstallError::spawn(command.join(" "), e.to_string()));
        }

        Ok(InstallOutcome::Launched { script })
    }
}

/// Installer for the given host family
pub fn installer_for(family: HostFamily, working_dir: &Path) -> Box<dyn Installer> {
    match family {
        HostFamily::Posix => Box::new(PosixInstaller::new(SystemProcessRunner::new(), working_dir)),
        HostFamily::Windows => Box::new(WindowsInstaller::new(SystemProcessRunner::new())),
    }
}

/// Full install command line for `download_url`
pub fn install_command(download_url: &str) -> Vec<String> {
    INSTALL_COMMAND
        .split_whitespace()
        .map(str::to_string)
        .chain(std::iter::once(download_url.to_string()))
        .collect()
}

/// Batch script contents for `download_url`
pub fn render_script(download_url: &str) -> String {
    WINDOWS_TEMPLATE.replace(URL_PLACEHOLDER, download_url)
}
