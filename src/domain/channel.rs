//! Update channel types

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two independent update tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Published releases
    Release,
    /// Timestamped snapshot builds
    Snapshot,
}

impl Channel {
    /// Both channels, in reporting order
    pub fn all() -> &'static [Channel] {
        &[Channel::Release, Channel::Snapshot]
    }

    /// Select the active channel
    ///
    /// An explicit flag wins; otherwise a local snapshot build follows the
    /// snapshot channel and everything else follows releases.
    pub fn select(release: bool, snapshots: bool, current_version: &str) -> Self {
        if snapshots {
            Channel::Snapshot
        } else if release {
            Channel::Release
        } else if current_version
            .to_uppercase()
            .contains(crate::domain::SNAPSHOT_MARKER)
        {
            Channel::Snapshot
        } else {
            Channel::Release
        }
    }

    /// Whether a version index entry belongs to this channel
    pub fn accepts(&self, identifier: &str) -> bool {
        crate::domain::is_snapshot_identifier(identifier) == (*self == Channel::Snapshot)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Release => "release",
            Channel::Snapshot => "snapshot",
        }
    }

    /// The CLI flag that switches to this channel
    pub fn flag(&self) -> &'static str {
        match self {
            Channel::Release => "-r",
            Channel::Snapshot => "-s",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
