//! Trace descriptor resolution.
//!
//! A trace either ships a `<trace>.json` sidecar or only legacy files: a
//! `*_capture_context<N>_files.txt` list and/or `*_context<N>.cpp` sources next
//! to `.h` headers. [`resolve_descriptor`] probes for the sidecar and picks the
//! matching [`TraceMetadataSource`].

use std::sync::LazyLock;

use regex::Regex;

use crate::{GenError, Result, TraceDir};

/// Header token present when a trace declares its own client context version.
pub(crate) const CONTEXT_VERSION_MARKER: &str = "kReplayContextClientMajorVersion";
/// Header token present when a trace declares its own draw surface color space.
pub(crate) const COLORSPACE_MARKER: &str = "kReplayDrawSurfaceColorSpace";

static FILES_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_capture_context(\d+)_files\.txt$").unwrap());
static CONTEXT_SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*_context(\d+)\.cpp$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TraceDescriptor {
    pub(crate) name: String,
    /// Decimal text, exactly as it appears in the file names.
    pub(crate) context_id: String,
    pub(crate) has_json_metadata: bool,
    pub(crate) has_context_version_consts: bool,
    pub(crate) has_colorspace_const: bool,
}

pub(crate) trait TraceMetadataSource {
    fn resolve(&self, dir: TraceDir<'_>) -> Result<TraceDescriptor>;
}

/// Traces carrying a JSON sidecar. Headers are never scanned; the context id
/// still comes from the legacy file names.
pub(crate) struct JsonSource;

/// Traces without a sidecar. Capability flags come from scanning every header.
pub(crate) struct LegacyScanSource;

impl TraceMetadataSource for JsonSource {
    fn resolve(&self, dir: TraceDir<'_>) -> Result<TraceDescriptor> {
        let files = dir.file_names()?;
        Ok(TraceDescriptor {
            name: dir.name().to_string(),
            context_id: find_context_id(dir.name(), &files)?,
            has_json_metadata: true,
            has_context_version_consts: false,
            has_colorspace_const: false,
        })
    }
}

impl TraceMetadataSource for LegacyScanSource {
    fn resolve(&self, dir: TraceDir<'_>) -> Result<TraceDescriptor> {
        let files = dir.file_names()?;
        let context_id = find_context_id(dir.name(), &files)?;
        let has_context_version_consts = headers_contain(dir, &files, CONTEXT_VERSION_MARKER)?;
        let has_colorspace_const = headers_contain(dir, &files, COLORSPACE_MARKER)?;
        tracing::debug!(
            trace = dir.name(),
            context_id = %context_id,
            has_context_version_consts,
            has_colorspace_const,
            "resolved legacy trace"
        );
        Ok(TraceDescriptor {
            name: dir.name().to_string(),
            context_id,
            has_json_metadata: false,
            has_context_version_consts,
            has_colorspace_const,
        })
    }
}

pub(crate) fn metadata_source(dir: TraceDir<'_>) -> &'static dyn TraceMetadataSource {
    if dir.has_json_metadata() {
        &JsonSource
    } else {
        &LegacyScanSource
    }
}

pub(crate) fn resolve_descriptor(dir: TraceDir<'_>) -> Result<TraceDescriptor> {
    metadata_source(dir).resolve(dir)
}

/// Context id from the files list name, falling back to `*_context<N>.cpp`.
/// Within one naming scheme every match must agree.
pub(crate) fn find_context_id(trace: &str, files: &[String]) -> Result<String> {
    for pattern in [&*FILES_LIST_RE, &*CONTEXT_SOURCE_RE] {
        if let Some(context) = unique_capture(trace, files, pattern)? {
            return Ok(context);
        }
    }
    Err(GenError::MissingContext {
        trace: trace.to_string(),
    })
}

fn unique_capture(trace: &str, files: &[String], pattern: &Regex) -> Result<Option<String>> {
    let mut found: Option<String> = None;
    for file in files {
        let Some(captures) = pattern.captures(file) else {
            continue;
        };
        let context = captures[1].to_string();
        match &found {
            None => found = Some(context),
            Some(first) if *first != context => {
                return Err(GenError::ConflictingContext {
                    trace: trace.to_string(),
                    first: first.clone(),
                    second: context,
                });
            }
            Some(_) => {}
        }
    }
    Ok(found)
}

fn headers_contain(dir: TraceDir<'_>, files: &[String], token: &str) -> Result<bool> {
    for file in files.iter().filter(|file| file.ends_with(".h")) {
        let bytes = fs_err::read(dir.file_path(file))?;
        if String::from_utf8_lossy(&bytes).contains(token) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace_dir::fixtures::write_trace;

    fn names(files: &[&str]) -> Vec<String> {
        files.iter().map(|file| file.to_string()).collect()
    }

    #[test]
    fn context_from_files_list() {
        let files = names(&["foo_capture_context12_files.txt", "foo_capture_context12.cpp"]);
        assert_eq!(find_context_id("foo", &files).unwrap(), "12");
    }

    #[test]
    fn context_from_cpp_when_no_files_list() {
        let files = names(&["foo_context7.cpp", "foo_context7.h", "notes.txt"]);
        assert_eq!(find_context_id("foo", &files).unwrap(), "7");
    }

    #[test]
    fn files_list_wins_over_cpp() {
        let files = names(&["foo_capture_context4_files.txt", "foo_context9.cpp"]);
        assert_eq!(find_context_id("foo", &files).unwrap(), "4");
    }

    #[test]
    fn numbered_frame_sources_do_not_match() {
        let files = names(&["foo_capture_context3_001.cpp", "foo_capture_context3.cpp"]);
        assert_eq!(find_context_id("foo", &files).unwrap(), "3");
    }

    #[test]
    fn missing_context_is_fatal() {
        let err = find_context_id("foo", &names(&["foo.json", "foo_angledata.gz"])).unwrap_err();
        assert!(matches!(err, GenError::MissingContext { ref trace } if trace == "foo"));
    }

    #[test]
    fn conflicting_context_is_fatal() {
        let err = find_context_id("foo", &names(&["foo_context1.cpp", "foo_context2.cpp"]))
            .unwrap_err();
        assert!(matches!(err, GenError::ConflictingContext { .. }));
    }

    #[test]
    fn legacy_flags_come_from_headers() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_trace(
            tmp.path(),
            "old",
            &[
                ("old_capture_context2.cpp", ""),
                ("old_capture_context2.h", "constexpr uint32_t kReplayContextClientMajorVersion = 2;"),
                ("extra.h", "// nothing"),
            ],
        );

        let desc = resolve_descriptor(TraceDir::new(tmp.path(), "old")).unwrap();
        assert_eq!(desc.context_id, "2");
        assert!(!desc.has_json_metadata);
        assert!(desc.has_context_version_consts);
        assert!(!desc.has_colorspace_const);
    }

    #[test]
    fn json_sidecar_skips_header_scan() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_trace(
            tmp.path(),
            "sample",
            &[
                ("sample_context3.cpp", ""),
                ("sample_context3.h", "kReplayDrawSurfaceColorSpace"),
                ("sample.json", r#"{"TraceFiles": ["a.cpp"]}"#),
            ],
        );

        let desc = resolve_descriptor(TraceDir::new(tmp.path(), "sample")).unwrap();
        assert_eq!(desc.context_id, "3");
        assert!(desc.has_json_metadata);
        assert!(!desc.has_colorspace_const);
    }
}
