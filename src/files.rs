//! Per-trace build inputs: compiled sources, runtime data files, and the
//! prefix of the trace's main capture source.

use serde::Deserialize;

use crate::{GenError, Result, TraceDescriptor, TraceDir};

const PAYLOAD_SUFFIX: &str = "angledata.gz";

/// The parts of a `<trace>.json` sidecar the generator reads.
#[derive(Debug, Deserialize)]
struct TraceMetadataFile {
    #[serde(rename = "TraceFiles")]
    trace_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileManifest {
    pub(crate) trace: String,
    pub(crate) context_id: String,
    /// `<trace>/<file>` paths, in the order the trace lists them.
    pub(crate) source_files: Vec<String>,
    /// The compressed payload, then the JSON sidecar when present.
    pub(crate) data_files: Vec<String>,
    /// `<trace>/<trace>_capture_context<N>` or `<trace>/<trace>_context<N>`.
    pub(crate) prefix: String,
}

pub(crate) fn build_file_manifest(dir: TraceDir<'_>, desc: &TraceDescriptor) -> Result<FileManifest> {
    let files = dir.file_names()?;
    let payload = find_payload(dir, &files)?;

    let source_files = list_sources(dir, &desc.context_id)?
        .iter()
        .map(|file| dir.relative(file))
        .collect();

    let mut data_files = vec![dir.relative(&payload)];
    if desc.has_json_metadata {
        data_files.push(dir.relative(&dir.json_file_name()));
    }

    Ok(FileManifest {
        trace: desc.name.clone(),
        context_id: desc.context_id.clone(),
        source_files,
        data_files,
        prefix: find_prefix(dir, &desc.context_id)?,
    })
}

/// Exactly one `<trace>*angledata.gz` payload must exist.
fn find_payload(dir: TraceDir<'_>, files: &[String]) -> Result<String> {
    let payloads: Vec<&String> = files
        .iter()
        .filter(|file| file.starts_with(dir.name()) && file.ends_with(PAYLOAD_SUFFIX))
        .collect();
    match payloads.as_slice() {
        [payload] => Ok((*payload).clone()),
        _ => Err(GenError::PayloadCount {
            trace: dir.name().to_string(),
            count: payloads.len(),
        }),
    }
}

/// The legacy files list when present, else the sidecar's `TraceFiles`.
fn list_sources(dir: TraceDir<'_>, context_id: &str) -> Result<Vec<String>> {
    let list_path = dir.file_path(&format!(
        "{}_capture_context{context_id}_files.txt",
        dir.name()
    ));
    if list_path.is_file() {
        let data = fs_err::read_to_string(&list_path)?;
        return Ok(data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect());
    }

    let json_path = dir.json_path();
    if !json_path.is_file() {
        return Err(GenError::MissingFileList { path: json_path });
    }
    let data = fs_err::read_to_string(&json_path)?;
    let metadata: TraceMetadataFile =
        serde_json::from_str(&data).map_err(|source| GenError::TraceMetadataParse {
            path: json_path.clone(),
            source,
        })?;
    Ok(metadata
        .trace_files
        .iter()
        .map(|file| file.trim().to_string())
        .collect())
}

fn find_prefix(dir: TraceDir<'_>, context_id: &str) -> Result<String> {
    let candidates = [
        format!("{}_capture_context{context_id}", dir.name()),
        format!("{}_context{context_id}", dir.name()),
    ];
    for stem in &candidates {
        if dir.file_path(&format!("{stem}.cpp")).is_file() {
            return Ok(dir.relative(stem));
        }
    }
    Err(GenError::MissingPrefixSource {
        path: dir.file_path(&format!("{}.cpp", candidates[1])),
    })
}
