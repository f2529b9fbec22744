//! The trace manifest: `{"traces": ["<name> <version>", ...]}`.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

use crate::{GenError, Result};

/// Version suffix character marking a package staged under the user-scoped
/// experimental prefix.
pub(crate) const EXPERIMENTAL_MARKER: char = 'x';

/// Top-level manifest object. Any key seen twice is an error, not only
/// `traces`.
#[derive(Debug)]
struct RawManifest {
    traces: Option<Vec<String>>,
}

impl<'de> Deserialize<'de> for RawManifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RawManifestVisitor)
    }
}

struct RawManifestVisitor;

impl<'de> Visitor<'de> for RawManifestVisitor {
    type Value = RawManifest;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a trace manifest object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawManifest, A::Error> {
        let mut seen = HashSet::new();
        let mut traces = None;
        while let Some(key) = map.next_key::<String>()? {
            if !seen.insert(key.clone()) {
                return Err(de::Error::custom(format!("duplicate key: {key:?}")));
            }
            if key == "traces" {
                traces = Some(map.next_value::<Vec<String>>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(RawManifest { traces })
    }
}

/// A package version with the experimental marker already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PackageVersion {
    pub(crate) version: String,
    pub(crate) experimental: bool,
}

impl PackageVersion {
    pub(crate) fn parse(raw: &str) -> Self {
        if raw.contains(EXPERIMENTAL_MARKER) {
            PackageVersion {
                version: raw.trim_matches(EXPERIMENTAL_MARKER).to_string(),
                experimental: true,
            }
        } else {
            PackageVersion {
                version: raw.to_string(),
                experimental: false,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ManifestEntry {
    pub(crate) name: String,
    pub(crate) version: PackageVersion,
}

impl ManifestEntry {
    pub(crate) fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(version), None) => Ok(ManifestEntry {
                name: name.to_string(),
                version: PackageVersion::parse(version),
            }),
            _ => Err(GenError::MalformedEntry {
                entry: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TraceManifest {
    pub(crate) entries: Vec<ManifestEntry>,
}

impl TraceManifest {
    pub(crate) fn trace_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub(crate) fn has_experimental(&self) -> bool {
        self.entries.iter().any(|entry| entry.version.experimental)
    }
}

/// Parses manifest text. Duplicate object keys and duplicate trace names are
/// both rejected.
pub(crate) fn parse_manifest(path: &Path, data: &str) -> Result<TraceManifest> {
    let raw: RawManifest = serde_json::from_str(data).map_err(|source| GenError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;
    let traces = raw.traces.ok_or(GenError::ManifestMissingTraces)?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(traces.len());
    for raw_entry in &traces {
        let entry = ManifestEntry::parse(raw_entry)?;
        if !seen.insert(entry.name.clone()) {
            return Err(GenError::DuplicateTrace { name: entry.name });
        }
        entries.push(entry);
    }
    Ok(TraceManifest { entries })
}

pub(crate) fn read_manifest(path: &Path) -> Result<TraceManifest> {
    let data = fs_err::read_to_string(path)?;
    parse_manifest(path, &data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Result<TraceManifest> {
        parse_manifest(Path::new("restricted_traces.json"), data)
    }

    #[test]
    fn entries_keep_manifest_order() {
        let manifest = parse(r#"{"traces": ["zeta 2", "alpha 7", "mid 1"]}"#).unwrap();
        let names: Vec<_> = manifest.trace_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(!manifest.has_experimental());
    }

    #[test]
    fn experimental_marker_is_stripped() {
        assert_eq!(
            PackageVersion::parse("5x"),
            PackageVersion {
                version: "5".to_string(),
                experimental: true
            }
        );
        assert_eq!(
            PackageVersion::parse("5"),
            PackageVersion {
                version: "5".to_string(),
                experimental: false
            }
        );
    }

    #[test]
    fn duplicate_trace_names_are_rejected() {
        let err = parse(r#"{"traces": ["a 1", "b 2", "a 3"]}"#).unwrap_err();
        assert!(matches!(err, GenError::DuplicateTrace { ref name } if name == "a"));
    }

    #[test]
    fn duplicate_object_keys_are_rejected() {
        let err = parse(r#"{"traces": ["a 1"], "traces": ["b 2"]}"#).unwrap_err();
        assert!(matches!(err, GenError::ManifestParse { .. }));
    }

    #[test]
    fn duplicate_unrelated_keys_are_rejected() {
        let err = parse(r#"{"traces": ["a 1"], "x": 1, "x": 2}"#).unwrap_err();
        assert!(matches!(err, GenError::ManifestParse { .. }));
        assert!(err.to_string().contains("duplicate key: \"x\""));
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let manifest = parse(r#"{"comment": {"a": [1]}, "traces": ["a 1"]}"#).unwrap();
        assert_eq!(manifest.entries.len(), 1);
    }

    #[test]
    fn missing_traces_key() {
        let err = parse(r#"{"other": []}"#).unwrap_err();
        assert!(matches!(err, GenError::ManifestMissingTraces));
    }

    #[test]
    fn entry_without_version_is_malformed() {
        let err = parse(r#"{"traces": ["lonely"]}"#).unwrap_err();
        assert!(matches!(err, GenError::MalformedEntry { .. }));
    }
}
