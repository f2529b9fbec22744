use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the generator.
pub(crate) type Result<T> = std::result::Result<T, GenError>;

/// Orchestrator stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Gni,
    Header,
    Source,
    IgnoreList,
    Deps,
}

impl Stage {
    /// The one-line message printed when this stage fails.
    pub(crate) fn failure_message(self) -> &'static str {
        match self {
            Stage::Gni => ".gni file generation failed.",
            Stage::Header => ".h file generation failed.",
            Stage::Source => ".cpp file generation failed.",
            Stage::IgnoreList => ".gitignore file generation failed",
            Stage::Deps => "DEPS file update failed",
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum GenError {
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    #[error("Failed to parse trace manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Trace data missing traces key.")]
    ManifestMissingTraces,

    #[error("Malformed trace entry {entry:?}: expected \"<name> <version>\"")]
    MalformedEntry { entry: String },

    #[error("duplicate key: {name:?}")]
    DuplicateTrace { name: String },

    #[error("Failed to find context number for {trace}")]
    MissingContext { trace: String },

    #[error("Trace {trace} has conflicting context numbers {first} and {second}")]
    ConflictingContext {
        trace: String,
        first: String,
        second: String,
    },

    #[error("Trace '{trace}' has {count} angledata.gz files")]
    PayloadCount { trace: String, count: usize },

    #[error("{path} does not exist")]
    MissingFileList { path: PathBuf },

    #[error("Trace metadata {path} is invalid: {source}")]
    TraceMetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} does not exist")]
    MissingPrefixSource { path: PathBuf },

    #[error("Unable to determine the current user: {reason}")]
    UserLookup { reason: Cow<'static, str> },

    #[error("Failed to parse generator config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", .stage.failure_message())]
    Stage {
        stage: Stage,
        #[source]
        source: Box<GenError>,
    },
}

impl GenError {
    pub(crate) fn stage(stage: Stage) -> impl FnOnce(GenError) -> GenError {
        move |source| GenError::Stage {
            stage,
            source: Box::new(source),
        }
    }
}

impl From<std::io::Error> for GenError {
    fn from(source: std::io::Error) -> Self {
        GenError::Io { source, path: None }
    }
}
