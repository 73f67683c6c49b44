//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Malformed version strings
//! - RegistryError: Issues with the remote artifact repository
//! - InstallError: Failures while running the platform installer
//! - ConfigError: Issues with the user-scoped update configuration
//!
//! Integrity check failures never surface as errors; the verifier
//! collapses them to "no match".

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Channel;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Artifact repository errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Installer errors
    #[error(transparent)]
    Install(#[from] InstallError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to version strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Input does not match `major.minor.patch` with an optional snapshot qualifier
    #[error("malformed version '{input}': expected major.minor.patch with an optional snapshot qualifier")]
    Malformed { input: String },

    /// A numeric component does not fit in 64 bits
    #[error("version component '{component}' in '{input}' is out of range")]
    OutOfRange { input: String, component: String },
}

/// Errors related to the remote artifact repository
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Transport failure or non-success HTTP status
    #[error("repository unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// The version index document could not be parsed
    #[error("failed to parse repository metadata from {url}: {message}")]
    MetadataParse { url: String, message: String },

    /// A version listed by the repository could not be parsed
    #[error("invalid version listed at {url}: {source}")]
    InvalidVersion {
        url: String,
        #[source]
        source: VersionError,
    },

    /// No version qualifies for the requested channel
    #[error("no {channel} version found at {url}")]
    NotFound { url: String, channel: Channel },
}

/// Errors raised while applying an update
#[derive(Error, Debug)]
pub enum InstallError {
    /// The installer process could not be started
    #[error("failed to run '{command}': {message}")]
    Spawn { command: String, message: String },

    /// The installer process exited unsuccessfully
    #[error("'{command}' exited with code: {code}")]
    ExitStatus { command: String, code: i32 },

    /// The installer script could not be materialized
    #[error("failed to write installer script {path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML settings file
    #[error("failed to parse TOML in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A configured URL is not usable as a repository base
    #[error("invalid repository URL '{value}': {message}")]
    InvalidUrl { value: String, message: String },
}

impl VersionError {
    /// Creates a new Malformed error
    pub fn malformed(input: impl Into<String>) -> Self {
        VersionError::Malformed {
            input: input.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new Unreachable error
    pub fn unreachable(url: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::Unreachable {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new MetadataParse error
    pub fn metadata_parse(url: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::MetadataParse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new NotFound error
    pub fn not_found(url: impl Into<String>, channel: Channel) -> Self {
        RegistryError::NotFound {
            url: url.into(),
            channel,
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(url: impl Into<String>, source: VersionError) -> Self {
        RegistryError::InvalidVersion {
            url: url.into(),
            source,
        }
    }

    /// Returns true if the repository simply has nothing for the channel
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}

impl InstallError {
    /// Creates a new Spawn error
    pub fn spawn(command: impl Into<String>, message: impl Into<String>) -> Self {
        InstallError::Spawn {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new ExitStatus error
    pub fn exit_status(command: impl Into<String>, code: i32) -> Self {
        InstallError::ExitStatus {
            command: command.into(),
            code,
        }
    }
}

impl ConfigError {
    /// Creates a new InvalidUrl error
    pub fn invalid_url(value: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidUrl {
            value: value.into(),
            message: message.into(),
        }
    }
}
