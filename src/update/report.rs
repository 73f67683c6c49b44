//! Rendering of update verdicts into user-facing messages

use super::UpdateRequest;
use crate::domain::{Channel, UpdateVerdict, VerdictReason, Version};
use serde::Serialize;
use std::cmp::Ordering;

/// Both channel verdicts of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub current_version: String,
    /// Channel whose verdict governs the update
    pub active_channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_url: Option<String>,
    pub release: UpdateVerdict,
    pub snapshot: UpdateVerdict,
}

/// What a non-check-only invocation should do
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Lines to show the user, in order
    pub messages: Vec<String>,
    /// Artifact to hand to the installer, if updating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_url: Option<String>,
}

impl UpdateReport {
    pub fn new(request: &UpdateRequest, release: UpdateVerdict, snapshot: UpdateVerdict) -> Self {
        Self {
            current_version: request.current_version.to_uppercase(),
            active_channel: request.active_channel(),
            override_url: request.override_url.clone(),
            release,
            snapshot,
        }
    }

    pub fn verdict(&self, channel: Channel) -> &UpdateVerdict {
        match channel {
            Channel::Release => &self.release,
            Channel::Snapshot => &self.snapshot,
        }
    }

    /// Verdict of the active channel
    pub fn active(&self) -> &UpdateVerdict {
        self.verdict(self.active_channel)
    }

    /// Summary of both channels without acting on either
    pub fn check_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();

        let tag = if self.override_url.is_some() {
            "custom"
        } else {
            self.active_channel.as_str()
        };

        if let Some(url) = &self.override_url {
            messages.push(format!("Custom URL specified: {}", url));
        }
        messages.push(format!(
            "Current blade version: {} ({})",
            self.current_version, tag
        ));

        for channel in Channel::all() {
            messages.push(format!(
                "Latest {} version: {}",
                channel,
                latest_label(self.verdict(*channel))
            ));
        }

        let mut invalid: Vec<&str> = Vec::new();
        for channel in Channel::all() {
            if let Some(detail) = invalid_detail(self.verdict(*channel)) {
                if !invalid.contains(&detail) {
                    invalid.push(detail);
                }
            }
        }
        messages.extend(invalid.into_iter().map(unable_to_compare));

        for channel in Channel::all() {
            let verdict = self.verdict(*channel);
            match (&verdict.candidate_version, verdict.should_update) {
                (Some(candidate), true) => {
                    messages.push(format!(
                        "A new {} update is available for blade: {}",
                        channel, candidate
                    ));
                    if *channel != self.active_channel {
                        messages.push(format!(
                            "Pass the {} flag to 'blade update' to switch to the {} channel",
                            channel.flag(),
                            channel
                        ));
                    }
                }
                _ => messages.push(no_updates_message(*channel)),
            }
        }

        messages
    }

    /// Messages and action for an actual update run
    ///
    /// Downgrades are never applied; the user gets the command to force one.
    pub fn plan(&self, install_command: &str) -> Plan {
        let mut messages = Vec::new();
        if let Some(url) = &self.override_url {
            messages.push(format!("Custom URL specified: {}", url));
        }

        let verdict = self.active();
        if let Some(detail) = invalid_detail(verdict) {
            messages.push(unable_to_compare(detail));
            messages.push(no_updates_message(self.active_channel));
            return Plan {
                messages,
                install_url: None,
            };
        }

        let (Some(candidate), Some(download_url)) =
            (verdict.candidate_version.as_deref(), verdict.download_url())
        else {
            messages.push(no_updates_message(self.active_channel));
            return Plan {
                messages,
                install_url: None,
            };
        };

        if verdict.should_update {
            messages.push(format!("Updating from: {}", download_url));
            return Plan {
                messages,
                install_url: Some(download_url.to_string()),
            };
        }

        let current = &self.current_version;
        let parsed = (Version::parse(current), Version::parse(candidate));

        match (verdict.reason, parsed) {
            (VerdictReason::AlreadyCurrent, _) => {
                messages.push(latest_message(current, self.active_channel));
            }
            (_, (Ok(current_version), Ok(candidate_version))) => {
                if current_version.is_equivalent(&candidate_version) {
                    messages.push(latest_message(current, self.active_channel));
                } else if current_version.compare(&candidate_version) == Ordering::Greater {
                    messages.push(format!(
                        "Current blade version {} is higher than the latest version {}",
                        current, candidate
                    ));
                    messages.push(
                        "Not updating, since downgrades are not supported at this time."
                            .to_string(),
                    );
                    messages.push(
                        "If you want to force a downgrade, use the following command:".to_string(),
                    );
                    messages.push(format!("\t{} {}", install_command, download_url));
                } else if current_version.is_snapshot() {
                    messages.push(format!(
                        "Current blade version {} is greater than the latest {} version {}",
                        current, self.active_channel, candidate
                    ));
                } else {
                    messages.push(format!(
                        "Current blade version {} (released) is greater than the latest {} version {}",
                        current, self.active_channel, candidate
                    ));
                }
            }
            (_, (Err(e), _)) | (_, (_, Err(e))) => {
                messages.push(unable_to_compare(&e.to_string()));
                messages.push(no_updates_message(self.active_channel));
            }
        }

        Plan {
            messages,
            install_url: None,
        }
    }
}

fn latest_label(verdict: &UpdateVerdict) -> String {
    let Some(coordinate) = &verdict.coordinate else {
        return "(Unavailable)".to_string();
    };

    let version = &coordinate.resolved_version;
    match version.qualifier().and_then(|q| q.published_at()) {
        Some(at) => format!("{} (published {})", version, at.format("%Y-%m-%d %H:%M:%S")),
        None => version.to_string(),
    }
}

fn latest_message(current: &str, channel: Channel) -> String {
    match channel {
        Channel::Release => format!(
            "Current blade version {} is the latest released version.",
            current
        ),
        Channel::Snapshot => format!(
            "Current blade version {} is the latest snapshot version.",
            current
        ),
    }
}

/// Detail of a verdict that failed on an unparseable version
fn invalid_detail(verdict: &UpdateVerdict) -> Option<&str> {
    match verdict.reason {
        VerdictReason::InvalidVersion => Some(verdict.detail.as_deref().unwrap_or("invalid version")),
        _ => None,
    }
}

fn unable_to_compare(detail: &str) -> String {
    format!("Unable to compare blade versions: {}", detail)
}

fn no_updates_message(channel: Channel) -> String {
    format!(
        "No new {} updates are available for this version of blade.",
        channel
    )
}
