use std::path::Path;

use crate::{Result, write_artifact};

/// One `<trace>/` line per trace, sorted, no trailing newline.
pub(crate) fn render_ignore_list<'a>(traces: impl IntoIterator<Item = &'a str>) -> String {
    let mut ignores: Vec<String> = traces.into_iter().map(|trace| format!("{trace}/")).collect();
    ignores.sort();
    ignores.join("\n")
}

pub(crate) fn write_ignore_list<'a>(
    path: &Path,
    traces: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    write_artifact(path, &render_ignore_list(traces))
}
