//! Rewrites the generated region of the DEPS file between the start and end
//! sentinel lines.

use std::io::Write;
use std::path::Path;

use atomic_write_file::AtomicWriteFile;

use crate::{GenError, GeneratorConfig, ManifestEntry, Result};

/// Where a line sits relative to the generated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Before,
    Inside,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatchStatus {
    /// Every start sentinel was matched by an end sentinel.
    Replaced,
    /// No start sentinel; the input is returned unchanged.
    NoRegion,
    /// A start sentinel with no end sentinel after it. The input is returned
    /// unchanged rather than dropping everything after the start line.
    Unterminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatchOutcome {
    pub(crate) text: String,
    pub(crate) status: PatchStatus,
}

/// Package path settings for the DEPS blocks.
#[derive(Debug, Clone)]
pub(crate) struct DepsLayout<'a> {
    pub(crate) install_prefix: &'a str,
    pub(crate) cipd_prefix: &'a str,
    /// Already resolved for the current user; `None` when no entry is
    /// experimental.
    pub(crate) experimental_prefix: Option<String>,
}

impl<'a> DepsLayout<'a> {
    pub(crate) fn new(config: &'a GeneratorConfig, user: Option<&str>) -> Self {
        Self {
            install_prefix: &config.install_prefix,
            cipd_prefix: &config.cipd_prefix,
            experimental_prefix: user
                .map(|user| config.experimental_cipd_prefix.replace("{user}", user)),
        }
    }

    fn package_prefix(&self, entry: &ManifestEntry) -> Result<&str> {
        if !entry.version.experimental {
            return Ok(self.cipd_prefix);
        }
        self.experimental_prefix
            .as_deref()
            .ok_or(GenError::UserLookup {
                reason: "experimental version without a resolved user".into(),
            })
    }
}

pub(crate) fn render_deps_block(layout: &DepsLayout<'_>, entry: &ManifestEntry) -> Result<String> {
    let trace = &entry.name;
    let version = &entry.version.version;
    let package_prefix = layout.package_prefix(entry)?;
    let install_prefix = layout.install_prefix;
    Ok(format!(
        "  '{install_prefix}/{trace}': {{
      'packages': [
        {{
            'package': '{package_prefix}/{trace}',
            'version': 'version:{version}',
        }},
      ],
      'dep_type': 'cipd',
      'condition': 'checkout_angle_restricted_traces',
  }},
"
    ))
}

pub(crate) fn render_deps_region(layout: &DepsLayout<'_>, entries: &[ManifestEntry]) -> Result<String> {
    let mut region = String::new();
    for entry in entries {
        region.push_str(&render_deps_block(layout, entry)?);
    }
    Ok(region)
}

/// Replaces the lines between each start/end sentinel pair with `replacement`.
/// Sentinel lines themselves are kept; a line matches a sentinel when it
/// contains it.
pub(crate) fn patch_region(original: &str, start: &str, end: &str, replacement: &str) -> PatchOutcome {
    let mut text = String::with_capacity(original.len() + replacement.len());
    let mut region = Region::Before;
    let mut saw_start = false;

    for line in original.split_inclusive('\n') {
        match region {
            Region::Before | Region::After => {
                text.push_str(line);
                if line.contains(start) {
                    region = Region::Inside;
                    saw_start = true;
                }
            }
            Region::Inside => {
                if line.contains(end) {
                    text.push_str(replacement);
                    text.push_str(line);
                    region = Region::After;
                }
            }
        }
    }

    match region {
        Region::Inside => PatchOutcome {
            text: original.to_string(),
            status: PatchStatus::Unterminated,
        },
        _ if !saw_start => PatchOutcome {
            text,
            status: PatchStatus::NoRegion,
        },
        _ => PatchOutcome {
            text,
            status: PatchStatus::Replaced,
        },
    }
}

/// Reads the whole DEPS file, patches it in memory and replaces it in one
/// atomic write.
pub(crate) fn update_deps(
    path: &Path,
    config: &GeneratorConfig,
    layout: &DepsLayout<'_>,
    entries: &[ManifestEntry],
) -> Result<PatchStatus> {
    let replacement = render_deps_region(layout, entries)?;
    let original = fs_err::read_to_string(path)?;
    let outcome = patch_region(&original, &config.deps_start, &config.deps_end, &replacement);

    match outcome.status {
        PatchStatus::Replaced => {}
        PatchStatus::NoRegion => {
            tracing::warn!(path = %path.display(), "DEPS has no generated region; left unchanged");
        }
        PatchStatus::Unterminated => {
            tracing::warn!(
                path = %path.display(),
                end = %config.deps_end,
                "DEPS region start has no matching end; left unchanged"
            );
        }
    }

    if outcome.text != original {
        write_whole(path, &outcome.text)?;
        tracing::info!(path = %path.display(), traces = entries.len(), "updated DEPS");
    }
    Ok(outcome.status)
}

fn write_whole(path: &Path, contents: &str) -> Result<()> {
    let io_err = |source: std::io::Error| GenError::Io {
        source,
        path: Some(path.to_path_buf()),
    };
    let mut file = AtomicWriteFile::options().open(path).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)?;
    file.commit().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PackageVersion;

    const START: &str = "# === ANGLE Restricted Trace Generated Code Start ===";
    const END: &str = "# === ANGLE Restricted Trace Generated Code End ===";

    fn entry(name: &str, version: &str) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            version: PackageVersion::parse(version),
        }
    }

    fn deps_text(region: &str) -> String {
        format!("deps = {{\n  {START}\n{region}  {END}\n  'other': 'x',\n}}\n")
    }

    #[test]
    fn block_uses_canonical_prefix() {
        let config = GeneratorConfig::default();
        let layout = DepsLayout::new(&config, None);
        let block = render_deps_block(&layout, &entry("sample", "3")).unwrap();
        assert_eq!(
            block,
            "  'src/tests/restricted_traces/sample': {\n\
             \x20     'packages': [\n\
             \x20       {\n\
             \x20           'package': 'angle/traces/sample',\n\
             \x20           'version': 'version:3',\n\
             \x20       },\n\
             \x20     ],\n\
             \x20     'dep_type': 'cipd',\n\
             \x20     'condition': 'checkout_angle_restricted_traces',\n\
             \x20 },\n"
        );
    }

    #[test]
    fn experimental_block_uses_user_prefix() {
        let config = GeneratorConfig::default();
        let layout = DepsLayout::new(&config, Some("alice"));
        let block = render_deps_block(&layout, &entry("sample", "5x")).unwrap();
        assert!(block.contains("'package': 'experimental/google.com/alice/angle/traces/sample',"));
        assert!(block.contains("'version': 'version:5',"));
    }

    #[test]
    fn experimental_without_user_is_an_error() {
        let config = GeneratorConfig::default();
        let layout = DepsLayout::new(&config, None);
        assert!(render_deps_block(&layout, &entry("sample", "5x")).is_err());
    }

    #[test]
    fn patch_replaces_old_region() {
        let original = deps_text("  'stale': {},\n  'older': {},\n");
        let outcome = patch_region(&original, START, END, "  'fresh': {},\n");
        assert_eq!(outcome.status, PatchStatus::Replaced);
        assert_eq!(outcome.text, deps_text("  'fresh': {},\n"));
    }

    #[test]
    fn patch_is_idempotent() {
        let original = deps_text("  'stale': {},\n");
        let once = patch_region(&original, START, END, "  'a': {},\n  'b': {},\n");
        let twice = patch_region(&once.text, START, END, "  'a': {},\n  'b': {},\n");
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn missing_start_leaves_text_alone() {
        let original = "deps = {}\n";
        let outcome = patch_region(original, START, END, "  'a': {},\n");
        assert_eq!(outcome.status, PatchStatus::NoRegion);
        assert_eq!(outcome.text, original);
    }

    // Known sharp edge: an unterminated region is reported, not an error, and
    // the file comes back byte-for-byte.
    #[test]
    fn unterminated_region_is_a_silent_no_op() {
        let original = format!("deps = {{\n  {START}\n  'stale': {{}},\n}}\n");
        let outcome = patch_region(&original, START, END, "  'a': {},\n");
        assert_eq!(outcome.status, PatchStatus::Unterminated);
        assert_eq!(outcome.text, original);
    }

    #[test]
    fn update_deps_rewrites_file_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("DEPS");
        std::fs::write(&path, deps_text("  'stale': {},\n")).unwrap();

        let config = GeneratorConfig::default();
        let layout = DepsLayout::new(&config, None);
        let entries = vec![entry("b", "2"), entry("a", "1")];

        assert_eq!(
            update_deps(&path, &config, &layout, &entries).unwrap(),
            PatchStatus::Replaced
        );
        let first = std::fs::read_to_string(&path).unwrap();
        update_deps(&path, &config, &layout, &entries).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        assert!(!first.contains("'stale'"));
        let b = first.find("restricted_traces/b'").unwrap();
        let a = first.find("restricted_traces/a'").unwrap();
        assert!(b < a);
    }
}
