use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{GenError, Result};

pub(crate) const DEFAULT_MANIFEST_FILE: &str = "restricted_traces.json";
pub(crate) const DEFAULT_GNI_FILE: &str = "restricted_traces_autogen.gni";
pub(crate) const DEFAULT_HEADER_FILE: &str = "restricted_traces_autogen.h";
pub(crate) const DEFAULT_SOURCE_FILE: &str = "restricted_traces_autogen.cpp";
pub(crate) const DEFAULT_IGNORE_FILE: &str = ".gitignore";
pub(crate) const DEFAULT_DEPS_PATH: &str = "../../../DEPS";
pub(crate) const DEFAULT_DEPS_START: &str = "# === ANGLE Restricted Trace Generated Code Start ===";
pub(crate) const DEFAULT_DEPS_END: &str = "# === ANGLE Restricted Trace Generated Code End ===";
pub(crate) const DEFAULT_INSTALL_PREFIX: &str = "src/tests/restricted_traces";
pub(crate) const DEFAULT_CIPD_PREFIX: &str = "angle/traces";
/// `{user}` is replaced with the invoking user's login name.
pub(crate) const DEFAULT_EXPERIMENTAL_CIPD_PREFIX: &str = "experimental/google.com/{user}/angle/traces";
pub(crate) const DEFAULT_SCRIPT_NAME: &str = "gen_restricted_traces.py";

/// Every fixed name the generator reads or writes.
///
/// Paths other than `root` are relative to `root`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GeneratorConfig {
    pub(crate) root: PathBuf,
    pub(crate) manifest_file: String,
    pub(crate) gni_file: String,
    pub(crate) header_file: String,
    pub(crate) source_file: String,
    pub(crate) ignore_file: String,
    pub(crate) deps_path: PathBuf,
    pub(crate) deps_start: String,
    pub(crate) deps_end: String,
    pub(crate) install_prefix: String,
    pub(crate) cipd_prefix: String,
    pub(crate) experimental_cipd_prefix: String,
    pub(crate) script_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            gni_file: DEFAULT_GNI_FILE.to_string(),
            header_file: DEFAULT_HEADER_FILE.to_string(),
            source_file: DEFAULT_SOURCE_FILE.to_string(),
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            deps_path: PathBuf::from(DEFAULT_DEPS_PATH),
            deps_start: DEFAULT_DEPS_START.to_string(),
            deps_end: DEFAULT_DEPS_END.to_string(),
            install_prefix: DEFAULT_INSTALL_PREFIX.to_string(),
            cipd_prefix: DEFAULT_CIPD_PREFIX.to_string(),
            experimental_cipd_prefix: DEFAULT_EXPERIMENTAL_CIPD_PREFIX.to_string(),
            script_name: DEFAULT_SCRIPT_NAME.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub(crate) fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub(crate) fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_file)
    }

    pub(crate) fn gni_path(&self) -> PathBuf {
        self.root.join(&self.gni_file)
    }

    pub(crate) fn header_path(&self) -> PathBuf {
        self.root.join(&self.header_file)
    }

    pub(crate) fn source_path(&self) -> PathBuf {
        self.root.join(&self.source_file)
    }

    pub(crate) fn ignore_path(&self) -> PathBuf {
        self.root.join(&self.ignore_file)
    }

    pub(crate) fn deps_file_path(&self) -> PathBuf {
        self.root.join(&self.deps_path)
    }

    /// Base name shared by the header and source artifacts, used in their
    /// banners and in the source's `#include`.
    pub(crate) fn artifact_stem(&self) -> &str {
        Path::new(&self.header_file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.header_file)
    }

    /// Declared inputs, for build-system dependency tracking.
    pub(crate) fn inputs(&self) -> Vec<&str> {
        vec![self.manifest_file.as_str()]
    }

    /// Declared outputs. The DEPS file is left out so dependency rolls do not
    /// force regeneration.
    pub(crate) fn outputs(&self) -> Vec<&str> {
        vec![
            self.gni_file.as_str(),
            self.header_file.as_str(),
            self.source_file.as_str(),
            self.ignore_file.as_str(),
        ]
    }
}

pub(crate) fn load_generator_config(path: &Path) -> Result<GeneratorConfig> {
    let data = fs_err::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|source| GenError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
