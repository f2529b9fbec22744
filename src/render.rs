//! Fixed-shape text artifacts: the GN build fragment, the trace table header
//! and its source.
//!
//! Templates use `{key}` placeholders. Substitution is a single pass, so
//! substituted values are never re-scanned and C++ braces need no escaping.

use std::path::Path;

use crate::{FileManifest, Result, TraceInfoRecord};

const GNI_TEMPLATE: &str = r#"# GENERATED FILE - DO NOT EDIT.
# Generated by {script_name} using data from {data_source_name}
#
# Copyright 2020 The ANGLE Project Authors. All rights reserved.
# Use of this source code is governed by a BSD-style license that can be
# found in the LICENSE file.
#
# A list of all restricted trace tests, paired with their context.
# Can be consumed by tests/BUILD.gn.

angle_restricted_traces = [
{test_list}
]
"#;

const HEADER_TEMPLATE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// {filename}: Types and enumerations for trace tests.

#ifndef ANGLE_RESTRICTED_TRACES_AUTOGEN_H_
#define ANGLE_RESTRICTED_TRACES_AUTOGEN_H_

#include <cstdint>
#include <vector>
#include <KHR/khrplatform.h>
#include <EGL/egl.h>

#include "restricted_traces_export.h"

namespace trace_angle
{
using GenericProc = void (*)();
using LoadProc    = GenericProc(KHRONOS_APIENTRY *)(const char *);
ANGLE_TRACE_LOADER_EXPORT void LoadEGL(LoadProc loadProc);
ANGLE_TRACE_LOADER_EXPORT void LoadGLES(LoadProc loadProc);

static constexpr size_t kTraceInfoMaxNameLen = 128;

static constexpr uint32_t kDefaultReplayContextClientMajorVersion = 3;
static constexpr uint32_t kDefaultReplayContextClientMinorVersion = 1;
static constexpr uint32_t kDefaultReplayDrawSurfaceColorSpace = EGL_COLORSPACE_LINEAR;

struct TraceInfo
{
    char name[kTraceInfoMaxNameLen];
    uint32_t contextClientMajorVersion;
    uint32_t contextClientMinorVersion;
    uint32_t frameEnd;
    uint32_t frameStart;
    uint32_t drawSurfaceWidth;
    uint32_t drawSurfaceHeight;
    uint32_t drawSurfaceColorSpace;
    uint32_t displayPlatformType;
    uint32_t displayDeviceType;
    int configRedBits;
    int configBlueBits;
    int configGreenBits;
    int configAlphaBits;
    int configDepthBits;
    int configStencilBits;
    bool isBinaryDataCompressed;
    bool areClientArraysEnabled;
    bool isBindGeneratesResourcesEnabled;
    bool isWebGLCompatibilityEnabled;
    bool isRobustResourceInitEnabled;
};

ANGLE_TRACE_EXPORT const TraceInfo &GetTraceInfo(const char *traceName);
}  // namespace trace_angle

#endif  // ANGLE_RESTRICTED_TRACES_AUTOGEN_H_
"#;

const SOURCE_TEMPLATE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// {filename}: Types and enumerations for trace tests.

#include "{filename}.h"

#include "common/PackedEnums.h"
#include "common/system_utils.h"

{trace_includes}

namespace trace_angle
{
namespace
{
constexpr size_t kNumTraces = {num_traces};
struct TracePair
{
    const char name[kTraceInfoMaxNameLen];
    TraceInfo info;
};
constexpr TracePair kTraceInfos[kNumTraces] = {
{trace_infos}
};
}

const TraceInfo &GetTraceInfo(const char *traceName)
{
    // Could be improved using std::lower_bound.
    for (const TracePair &tracePair : kTraceInfos)
    {
        if (strncmp(tracePair.name, traceName, kTraceInfoMaxNameLen) == 0)
        {
            return tracePair.info;
        }
    }
    UNREACHABLE();
    return kTraceInfos[0].info;
}
}  // namespace trace_angle
"#;

/// Names stamped into every artifact banner.
#[derive(Debug, Clone)]
pub(crate) struct ArtifactContext {
    pub(crate) script_name: String,
    pub(crate) data_source_name: String,
    /// Stem shared by the header and source; the source includes `<filename>.h`.
    pub(crate) filename: String,
}

/// One row of the generated `kTraceInfos` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TraceTableEntry {
    pub(crate) name: String,
    /// Legacy capture header to include, for traces without JSON metadata.
    pub(crate) header: Option<String>,
    pub(crate) info: Option<TraceInfoRecord>,
}

/// Replaces each `{key}` whose key appears in `values`; anything else is
/// copied through untouched.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let replacement = tail[1..].find('}').and_then(|close| {
            let key = &tail[1..=close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close + 2))
        });
        match replacement {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn render_gni(ctx: &ArtifactContext, manifests: &[FileManifest]) -> String {
    let test_list = manifests
        .iter()
        .map(|manifest| {
            format!(
                "[\"{}\", {}, [{}], [{}], \"{}\"]",
                manifest.trace,
                manifest.context_id,
                quoted_list(&manifest.source_files),
                quoted_list(&manifest.data_files),
                manifest.prefix
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    fill_template(
        GNI_TEMPLATE,
        &[
            ("script_name", &ctx.script_name),
            ("data_source_name", &ctx.data_source_name),
            ("test_list", &test_list),
        ],
    )
}

pub(crate) fn render_header(ctx: &ArtifactContext) -> String {
    fill_template(
        HEADER_TEMPLATE,
        &[
            ("script_name", &ctx.script_name),
            ("data_source_name", &ctx.data_source_name),
            ("filename", &ctx.filename),
        ],
    )
}

pub(crate) fn render_source(ctx: &ArtifactContext, entries: &[TraceTableEntry]) -> String {
    let trace_includes = entries
        .iter()
        .filter_map(|entry| entry.header.as_ref())
        .map(|header| format!("#include \"{header}\""))
        .collect::<Vec<_>>()
        .join("\n");
    let trace_infos = entries
        .iter()
        .map(|entry| {
            let fields = entry
                .info
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            format!("{{\"{}\", {{{fields}}}}}", entry.name)
        })
        .collect::<Vec<_>>()
        .join(",\n");
    let num_traces = entries.len().to_string();
    fill_template(
        SOURCE_TEMPLATE,
        &[
            ("script_name", &ctx.script_name),
            ("data_source_name", &ctx.data_source_name),
            ("filename", &ctx.filename),
            ("trace_includes", &trace_includes),
            ("num_traces", &num_traces),
            ("trace_infos", &trace_infos),
        ],
    )
}

/// Overwrites `path` with `contents`.
pub(crate) fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    fs_err::write(path, contents)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}
