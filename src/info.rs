//! Runtime `TraceInfo` initializers for the generated trace table.

use std::fmt;

use crate::TraceDescriptor;

pub(crate) const DEFAULT_MAJOR_VERSION: &str = "kDefaultReplayContextClientMajorVersion";
pub(crate) const DEFAULT_MINOR_VERSION: &str = "kDefaultReplayContextClientMinorVersion";
pub(crate) const DEFAULT_COLORSPACE: &str = "kDefaultReplayDrawSurfaceColorSpace";

/// Placeholder counts for the tail of `TraceInfo`: platform/device types and
/// config bits (zero), then the boolean feature switches (false).
const ZERO_PLACEHOLDERS: usize = 8;
const FALSE_PLACEHOLDERS: usize = 5;

/// One initializer in a `TraceInfo` aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InfoField {
    Name(String),
    /// `<trace>::<constant>` from the trace's own header.
    TraceConst { trace: String, constant: &'static str },
    /// A global default declared by the generated header.
    DefaultConst(&'static str),
    Zero,
    False,
}

impl fmt::Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoField::Name(name) => write!(f, "\"{name}\""),
            InfoField::TraceConst { trace, constant } => write!(f, "{trace}::{constant}"),
            InfoField::DefaultConst(constant) => f.write_str(constant),
            InfoField::Zero => f.write_str("0"),
            InfoField::False => f.write_str("false"),
        }
    }
}

/// Field values in `TraceInfo` declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TraceInfoRecord {
    pub(crate) fields: Vec<InfoField>,
}

impl fmt::Display for TraceInfoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Builds the legacy info record, or `None` for traces described by a JSON
/// sidecar (the runtime reads those itself).
pub(crate) fn build_trace_info(desc: &TraceDescriptor) -> Option<TraceInfoRecord> {
    if desc.has_json_metadata {
        return None;
    }

    let trace_const = |constant: &'static str| InfoField::TraceConst {
        trace: desc.name.clone(),
        constant,
    };

    let mut fields = vec![InfoField::Name(desc.name.clone())];
    if desc.has_context_version_consts {
        fields.push(trace_const("kReplayContextClientMajorVersion"));
        fields.push(trace_const("kReplayContextClientMinorVersion"));
    } else {
        fields.push(InfoField::DefaultConst(DEFAULT_MAJOR_VERSION));
        fields.push(InfoField::DefaultConst(DEFAULT_MINOR_VERSION));
    }

    fields.push(trace_const("kReplayFrameStart"));
    fields.push(trace_const("kReplayFrameEnd"));
    fields.push(trace_const("kReplayDrawSurfaceWidth"));
    fields.push(trace_const("kReplayDrawSurfaceHeight"));

    if desc.has_colorspace_const {
        fields.push(trace_const("kReplayDrawSurfaceColorSpace"));
    } else {
        fields.push(InfoField::DefaultConst(DEFAULT_COLORSPACE));
    }

    fields.extend(std::iter::repeat_n(InfoField::Zero, ZERO_PLACEHOLDERS));
    fields.extend(std::iter::repeat_n(InfoField::False, FALSE_PLACEHOLDERS));

    Some(TraceInfoRecord { fields })
}
