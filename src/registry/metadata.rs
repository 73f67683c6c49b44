//! `maven-metadata.xml` parsing
//!
//! Two document shapes are read:
//! - the artifact index, listing every published `<version>`
//! - the per-version snapshot index, listing `<snapshotVersion>` entries
//!   whose `<value>` is the timestamped build identifier

use quick_xml::events::Event;
use quick_xml::Reader;

/// One `<snapshotVersion>` entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub classifier: Option<String>,
    pub extension: Option<String>,
    pub value: String,
}

/// Legacy `<snapshot>` block with a timestamp and build number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LegacySnapshot {
    timestamp: Option<String>,
    build_number: Option<String>,
}

/// Parsed contents of a `maven-metadata.xml` document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenMetadata {
    /// Every `<version>` element, in document order
    pub versions: Vec<String>,
    /// Every `<snapshotVersion>` element, in document order
    pub snapshot_versions: Vec<SnapshotVersion>,
    legacy_snapshot: LegacySnapshot,
}

impl MavenMetadata {
    /// Parse a metadata document
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut metadata = MavenMetadata::default();
        let mut stack: Vec<String> = Vec::new();
        let mut current_snapshot: Option<SnapshotVersion> = None;
        let mut saw_element = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("at position {}: {}", reader.error_position(), e))?;

            match event {
                Event::Start(e) => {
                    saw_element = true;
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if name == "snapshotVersion" {
                        current_snapshot = Some(SnapshotVersion::default());
                    }
                    stack.push(name);
                }
                Event::Empty(_) => saw_element = true,
                Event::End(_) => {
                    if stack.pop().as_deref() == Some("snapshotVersion") {
                        if let Some(entry) = current_snapshot.take() {
                            metadata.snapshot_versions.push(entry);
                        }
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| e.to_string())?;
                    metadata.accept_text(&stack, current_snapshot.as_mut(), text.trim());
                }
                Event::CData(c) => {
                    let bytes = c.into_inner();
                    let text = String::from_utf8_lossy(&bytes);
                    metadata.accept_text(&stack, current_snapshot.as_mut(), text.trim());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_element {
            return Err("document contains no XML elements".to_string());
        }
        if !stack.is_empty() {
            return Err(format!("unexpected end of document inside <{}>", stack.join("><")));
        }

        Ok(metadata)
    }

    fn accept_text(
        &mut self,
        stack: &[String],
        snapshot: Option<&mut SnapshotVersion>,
        text: &str,
    ) {
        if text.is_empty() {
            return;
        }

        let element = stack.last().map(String::as_str);
        let parent = stack.len().checked_sub(2).map(|i| stack[i].as_str());

        match (parent, element) {
            (_, Some("version")) => self.versions.push(text.to_string()),
            (Some("snapshotVersion"), Some(field)) => {
                if let Some(entry) = snapshot {
                    match field {
                        "value" => entry.value = text.to_string(),
                        "extension" => entry.extension = Some(text.to_string()),
                        "classifier" => entry.classifier = Some(text.to_string()),
                        _ => {}
                    }
                }
            }
            (Some("snapshot"), Some("timestamp")) => {
                self.legacy_snapshot.timestamp = Some(text.to_string())
            }
            (Some("snapshot"), Some("buildNumber")) => {
                self.legacy_snapshot.build_number = Some(text.to_string())
            }
            _ => {}
        }
    }

    /// Timestamped build identifier of the main artifact of `version`
    ///
    /// Prefers the unclassified `jar` entry, then the first listed entry,
    /// then the legacy `<snapshot>` timestamp and build number.
    pub fn snapshot_value(&self, version: &str) -> Option<String> {
        let jar = self.snapshot_versions.iter().find(|s| {
            s.classifier.is_none() && s.extension.as_deref() == Some("jar") && !s.value.is_empty()
        });

        if let Some(entry) = jar.or_else(|| self.snapshot_versions.first()) {
            if !entry.value.is_empty() {
                return Some(entry.value.clone());
            }
        }

        let LegacySnapshot {
            timestamp: Some(timestamp),
            build_number: Some(build_number),
        } = &self.legacy_snapshot
        else {
            return None;
        };

        version
            .strip_suffix("SNAPSHOT")
            .map(|prefix| format!("{}{}-{}", prefix, timestamp, build_number))
    }
}
