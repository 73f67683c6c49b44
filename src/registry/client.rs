//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Transport and status errors mapped to `RegistryError::Unreachable`
//!
//! Requests are issued once; a failed fetch is reported to the caller
//! rather than retried.

use crate::error::RegistryError;
use crate::registry::Fetcher;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("bladeup/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(None, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    ///
    /// Without a timeout the transport default applies.
    pub fn with_config(timeout: Option<Duration>, user_agent: &str) -> Result<Self, RegistryError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            RegistryError::unreachable("", format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Perform a GET request, failing on transport errors and non-2xx statuses
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, RegistryError> {
        debug!(url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::unreachable(url, "request timed out")
            } else {
                RegistryError::unreachable(url, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::unreachable(url, format!("HTTP {}", status)));
        }

        Ok(response)
    }

    /// Perform a GET request and return the body as text
    pub async fn get_text(&self, url: &str) -> Result<String, RegistryError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| {
            RegistryError::unreachable(url, format!("failed to read response body: {}", e))
        })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String, RegistryError> {
        self.get_text(url).await
    }
}
