use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::Result;

/// One trace's directory, addressed relative to an explicit base directory.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TraceDir<'a> {
    root: &'a Path,
    name: &'a str,
}

impl<'a> TraceDir<'a> {
    pub(crate) fn new(root: &'a Path, name: &'a str) -> Self {
        Self { root, name }
    }

    pub(crate) fn name(&self) -> &'a str {
        self.name
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.root.join(self.name)
    }

    pub(crate) fn file_path(&self, file: &str) -> PathBuf {
        self.path().join(file)
    }

    /// `<trace>/<file>`, the form generated artifacts refer to files by.
    pub(crate) fn relative(&self, file: &str) -> String {
        format!("{}/{file}", self.name)
    }

    pub(crate) fn json_file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    pub(crate) fn json_path(&self) -> PathBuf {
        self.file_path(&self.json_file_name())
    }

    pub(crate) fn has_json_metadata(&self) -> bool {
        self.json_path().is_file()
    }

    /// Names of the regular files directly inside the trace directory, sorted.
    /// Symlinks count when their target is a regular file.
    pub(crate) fn file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(self.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}
