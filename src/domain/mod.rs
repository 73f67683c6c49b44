//! Core domain models for bladeup
//!
//! This module contains the fundamental types used throughout the application:
//! - Version model for release and snapshot builds
//! - Update channels
//! - Resolved artifact coordinates
//! - Per-channel update verdicts

mod artifact;
mod channel;
mod verdict;
mod version;

pub use artifact::{normalize_base_url, ArtifactCoordinate};
pub use channel::Channel;
pub use verdict::{UpdateVerdict, VerdictReason};
pub use version::{
    is_snapshot_identifier, SemanticVersion, SnapshotQualifier, Version, SNAPSHOT_MARKER,
};
