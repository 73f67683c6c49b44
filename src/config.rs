//! User-scoped update configuration
//!
//! Resolved once at startup from the blade user directory (`~/.blade`):
//! - `update.url`: a single line holding an alternate repository base URL
//! - `update.toml`: optional repository and HTTP settings

use crate::domain::normalize_base_url;
use crate::error::ConfigError;
use crate::update::ChannelUrls;
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const BASE_CDN_URL: &str = "https://repository-cdn.liferay.com/nexus/content/repositories/";

const BLADE_CLI_CONTEXT: &str = "com/liferay/blade/com.liferay.blade.cli/";

/// Artifact id of the blade CLI jar
pub const DEFAULT_ARTIFACT_ID: &str = "com.liferay.blade.cli";

/// Override URL file name inside the user directory
pub const OVERRIDE_URL_FILE: &str = "update.url";

/// Settings file name inside the user directory
pub const SETTINGS_FILE: &str = "update.toml";

/// Contents of `update.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    releases_url: Option<String>,
    snapshots_url: Option<String>,
    artifact_id: Option<String>,
    timeout_secs: Option<u64>,
}

/// Resolved update configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub releases_url: String,
    pub snapshots_url: String,
    pub artifact_id: String,
    /// HTTP timeout; transport default when unset
    pub timeout: Option<Duration>,
    /// Base URL from `update.url`, replacing both channel repositories
    pub override_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            releases_url: format!("{}liferay-public-releases/{}", BASE_CDN_URL, BLADE_CLI_CONTEXT),
            snapshots_url: format!("{}liferay-public-snapshots/{}", BASE_CDN_URL, BLADE_CLI_CONTEXT),
            artifact_id: DEFAULT_ARTIFACT_ID.to_string(),
            timeout: None,
            override_url: None,
        }
    }
}

impl Settings {
    /// Default blade user directory (`~/.blade`)
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".blade"))
    }

    /// Load from the default user directory, or defaults without a home
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_dir() {
            Some(dir) => Self::load_from(&dir),
            None => Ok(Self::default()),
        }
    }

    /// Load from `dir`; missing files leave the defaults in place
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        let settings_path = dir.join(SETTINGS_FILE);
        if settings_path.is_file() {
            let content = fs::read_to_string(&settings_path).map_err(|source| ConfigError::Read {
                path: settings_path.clone(),
                source,
            })?;
            let file: SettingsFile =
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: settings_path.clone(),
                    message: e.to_string(),
                })?;
            settings.apply(file)?;
            debug!(path = %settings_path.display(), "loaded update settings");
        }

        settings.override_url = read_override_url(&dir.join(OVERRIDE_URL_FILE))?;

        Ok(settings)
    }

    fn apply(&mut self, file: SettingsFile) -> Result<(), ConfigError> {
        if let Some(url) = file.releases_url {
            self.releases_url = validate_url(&url)?;
        }
        if let Some(url) = file.snapshots_url {
            self.snapshots_url = validate_url(&url)?;
        }
        if let Some(artifact_id) = file.artifact_id {
            self.artifact_id = artifact_id;
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        Ok(())
    }

    /// Repository locations per channel
    pub fn channel_urls(&self) -> ChannelUrls {
        ChannelUrls {
            releases: self.releases_url.clone(),
            snapshots: self.snapshots_url.clone(),
        }
    }
}

/// Read the override URL file
///
/// Only a regular, non-empty file counts; its first line is the URL.
pub fn read_override_url(path: &Path) -> Result<Option<String>, ConfigError> {
    let Ok(metadata) = fs::metadata(path) else {
        return Ok(None);
    };
    if !metadata.is_file() || metadata.len() == 0 {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match content.lines().next().map(str::trim) {
        Some(line) if !line.is_empty() => {
            debug!(path = %path.display(), url = line, "using override URL");
            validate_url(line).map(Some)
        }
        _ => Ok(None),
    }
}

/// Check that `value` is an absolute http(s) URL and normalize its trailing slash
pub fn validate_url(value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::invalid_url(value, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(normalize_base_url(value)),
        other => Err(ConfigError::invalid_url(
            value,
            format!("unsupported scheme '{}'", other),
        )),
    }
}
