//! Full generation run: manifest → per-trace resolution → artifacts → DEPS.

use std::path::Path;

use crate::{
    ArtifactContext, DepsLayout, FileManifest, GenError, GeneratorConfig, PatchStatus, Result,
    Stage, TraceDescriptor, TraceDir, TraceInfoRecord, TraceManifest, TraceTableEntry,
    build_file_manifest, build_trace_info, current_user, read_manifest, render_gni,
    render_header, render_source, resolve_descriptor, update_deps, write_artifact,
    write_ignore_list,
};

/// Everything the artifacts need to know about one trace.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedTrace {
    pub(crate) descriptor: TraceDescriptor,
    pub(crate) info: Option<TraceInfoRecord>,
    pub(crate) files: FileManifest,
}

impl ResolvedTrace {
    fn table_entry(&self) -> TraceTableEntry {
        let desc = &self.descriptor;
        TraceTableEntry {
            name: desc.name.clone(),
            header: (!desc.has_json_metadata).then(|| {
                format!("{0}/{0}_capture_context{1}.h", desc.name, desc.context_id)
            }),
            info: self.info.clone(),
        }
    }
}

pub(crate) fn resolve_trace(root: &Path, name: &str) -> Result<ResolvedTrace> {
    let dir = TraceDir::new(root, name);
    let descriptor = resolve_descriptor(dir)?;
    let info = build_trace_info(&descriptor);
    let files = build_file_manifest(dir, &descriptor)?;
    Ok(ResolvedTrace {
        descriptor,
        info,
        files,
    })
}

/// The manifest plus every trace resolved, in manifest order.
#[derive(Debug, Clone)]
pub(crate) struct GenerationPlan {
    pub(crate) manifest: TraceManifest,
    pub(crate) traces: Vec<ResolvedTrace>,
}

impl GenerationPlan {
    pub(crate) fn file_manifests(&self) -> Vec<FileManifest> {
        self.traces.iter().map(|trace| trace.files.clone()).collect()
    }

    pub(crate) fn table_entries(&self) -> Vec<TraceTableEntry> {
        self.traces.iter().map(ResolvedTrace::table_entry).collect()
    }
}

/// Reads the manifest and resolves every trace. Nothing is written.
pub(crate) fn plan_generation(config: &GeneratorConfig) -> Result<GenerationPlan> {
    let manifest = read_manifest(&config.manifest_path())?;
    let mut traces = Vec::with_capacity(manifest.entries.len());
    for entry in &manifest.entries {
        tracing::debug!(trace = %entry.name, "resolving trace");
        traces.push(resolve_trace(&config.root, &entry.name)?);
    }
    Ok(GenerationPlan { manifest, traces })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GenerationSummary {
    pub(crate) traces: usize,
    pub(crate) deps: PatchStatus,
}

/// Writes the build fragment, header, source and ignore list, then patches
/// DEPS. The header is written before the source that includes it. A failing
/// stage stops the run; earlier artifacts stay on disk.
pub(crate) fn run_generation(config: &GeneratorConfig) -> Result<GenerationSummary> {
    let plan = plan_generation(config)?;
    let ctx = ArtifactContext {
        script_name: config.script_name.clone(),
        data_source_name: config.manifest_file.clone(),
        filename: config.artifact_stem().to_string(),
    };

    write_artifact(&config.gni_path(), &render_gni(&ctx, &plan.file_manifests()))
        .map_err(GenError::stage(Stage::Gni))?;
    write_artifact(&config.header_path(), &render_header(&ctx))
        .map_err(GenError::stage(Stage::Header))?;
    write_artifact(&config.source_path(), &render_source(&ctx, &plan.table_entries()))
        .map_err(GenError::stage(Stage::Source))?;
    write_ignore_list(&config.ignore_path(), plan.manifest.trace_names())
        .map_err(GenError::stage(Stage::IgnoreList))?;

    let deps = patch_deps(config, &plan.manifest).map_err(GenError::stage(Stage::Deps))?;

    Ok(GenerationSummary {
        traces: plan.traces.len(),
        deps,
    })
}

fn patch_deps(config: &GeneratorConfig, manifest: &TraceManifest) -> Result<PatchStatus> {
    let user = if manifest.has_experimental() {
        Some(current_user()?)
    } else {
        None
    };
    let layout = DepsLayout::new(config, user.as_deref());
    update_deps(&config.deps_file_path(), config, &layout, &manifest.entries)
}
