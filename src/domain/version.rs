//! Version model for blade builds
//!
//! Versions are parsed once at the boundary into a tagged [`Version`]:
//! a `major.minor.patch` triple plus an optional [`SnapshotQualifier`].
//!
//! Accepted forms:
//! - `3.9.2` (release)
//! - `3.9.2.SNAPSHOT201907172145` (local build, also `-SNAPSHOT<n>`)
//! - `3.9.2-20190717.214535-5` (published snapshot, timestamped)
//! - `3.9.2-SNAPSHOT` (bare snapshot label from a version index)

use crate::error::VersionError;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Marker identifying snapshot builds in both naming formats
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

static CORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)(.*)$").unwrap());

static LOCAL_SNAPSHOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[.-]SNAPSHOT(\d+)$").unwrap());

static PUBLISHED_SNAPSHOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-(\d+)\.(\d{4})(\d{2})-(\d+)$").unwrap());

static SNAPSHOT_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[.-]SNAPSHOT$").unwrap());

/// A `major.minor.patch` triple, ordered lexicographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Build lineage suffix carried by snapshot versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotQualifier {
    /// Local build naming: `SNAPSHOT<ordinal>`
    Local { ordinal: u64 },
    /// Repository naming: `<date>.<HHMM><SS>-<build>`
    ///
    /// The ordinal is the date digits followed by `HHMM`, which is the
    /// number a local build of the same lineage carries.
    Published {
        ordinal: u64,
        timestamp: String,
        build: u64,
    },
    /// Bare `-SNAPSHOT` label as listed in a version index
    Label,
}

impl SnapshotQualifier {
    /// Snapshot ordinal, comparable across local and published formats
    pub fn ordinal(&self) -> Option<u64> {
        match self {
            SnapshotQualifier::Local { ordinal } | SnapshotQualifier::Published { ordinal, .. } => {
                Some(*ordinal)
            }
            SnapshotQualifier::Label => None,
        }
    }

    /// Informational publish time of a repository snapshot
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        match self {
            SnapshotQualifier::Published { timestamp, .. } => {
                NaiveDateTime::parse_from_str(timestamp, "%Y%m%d.%H%M%S").ok()
            }
            _ => None,
        }
    }
}

/// A parsed blade version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    core: SemanticVersion,
    qualifier: Option<SnapshotQualifier>,
    raw: String,
}

impl Version {
    /// Parse a version string, failing with [`VersionError::Malformed`]
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let raw = text.trim().to_uppercase();
        let caps = CORE_RE
            .captures(&raw)
            .ok_or_else(|| VersionError::malformed(text))?;

        let core = SemanticVersion::new(
            parse_component(text, &caps[1])?,
            parse_component(text, &caps[2])?,
            parse_component(text, &caps[3])?,
        );
        let qualifier = parse_qualifier(text, &caps[4])?;

        Ok(Self {
            core,
            qualifier,
            raw,
        })
    }

    pub fn core(&self) -> SemanticVersion {
        self.core
    }

    pub fn qualifier(&self) -> Option<&SnapshotQualifier> {
        self.qualifier.as_ref()
    }

    /// Original text, normalized to upper case
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_snapshot(&self) -> bool {
        self.qualifier.is_some()
    }

    /// True for a locally built snapshot (`SNAPSHOT<n>`)
    pub fn is_local_snapshot(&self) -> bool {
        matches!(self.qualifier, Some(SnapshotQualifier::Local { .. }))
    }

    /// True for a timestamped repository snapshot
    pub fn is_published_snapshot(&self) -> bool {
        matches!(self.qualifier, Some(SnapshotQualifier::Published { .. }))
    }

    pub fn snapshot_ordinal(&self) -> Option<u64> {
        self.qualifier.as_ref().and_then(SnapshotQualifier::ordinal)
    }

    /// Numeric comparison of the `major.minor.patch` triples
    pub fn compare(&self, other: &Version) -> Ordering {
        self.core.cmp(&other.core)
    }

    /// Equivalence used for "already latest" reporting
    ///
    /// A local snapshot and a published snapshot are equivalent only when
    /// their ordinals match, regardless of the qualifier format. Equal
    /// triples with different ordinals are different builds.
    pub fn is_equivalent(&self, other: &Version) -> bool {
        if self.is_local_snapshot() && other.is_published_snapshot() {
            return self.snapshot_ordinal() == other.snapshot_ordinal();
        }
        self.core == other.core
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Returns true if a version index entry is a snapshot
pub fn is_snapshot_identifier(text: &str) -> bool {
    text.contains(SNAPSHOT_MARKER)
}

fn parse_component(input: &str, digits: &str) -> Result<u64, VersionError> {
    digits.parse().map_err(|_| VersionError::OutOfRange {
        input: input.to_string(),
        component: digits.to_string(),
    })
}

fn parse_qualifier(input: &str, rest: &str) -> Result<Option<SnapshotQualifier>, VersionError> {
    if rest.is_empty() {
        return Ok(None);
    }

    if let Some(caps) = LOCAL_SNAPSHOT_RE.captures(rest) {
        return Ok(Some(SnapshotQualifier::Local {
            ordinal: parse_component(input, &caps[1])?,
        }));
    }

    if let Some(caps) = PUBLISHED_SNAPSHOT_RE.captures(rest) {
        let ordinal = parse_component(input, &format!("{}{}", &caps[1], &caps[2]))?;
        return Ok(Some(SnapshotQualifier::Published {
            ordinal,
            timestamp: format!("{}.{}{}", &caps[1], &caps[2], &caps[3]),
            build: parse_component(input, &caps[4])?,
        }));
    }

    if SNAPSHOT_LABEL_RE.is_match(rest) {
        return Ok(Some(SnapshotQualifier::Label));
    }

    Err(VersionError::malformed(input))
}
