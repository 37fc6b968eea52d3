//! Shell document assembly.
//!
//! The shell (an HTML page, or whatever document a target ships) is a
//! template carrying two well-known markers. Assembly replaces the
//! include marker with one script tag per include entry, in list order,
//! and the options marker with the caller-supplied runtime options
//! payload. A template may deliberately omit either marker; the
//! corresponding substitution is then skipped.

use std::path::Path;

use crate::error::{ExportError, Result};
use crate::fs::FileSystem;
use crate::includes::IncludeList;

/// Marker replaced by the inclusion tags.
pub const INCLUDE_FILES_MARKER: &str = "<!-- STAGE_INCLUDE_FILES -->";

/// Marker replaced by the runtime options payload.
pub const RUNTIME_OPTIONS_MARKER: &str = "/* STAGE_RUNTIME_OPTIONS */";

/// Fixed name of the assembled shell document.
pub const INDEX_FILE: &str = "index.html";

/// Substitute both markers in the template text. Pure; the result still
/// has to be written out.
pub fn complete_index_file(
    template: &str,
    includes: &IncludeList,
    runtime_options_payload: &str,
) -> String {
    let mut out = template.to_string();

    if out.contains(INCLUDE_FILES_MARKER) {
        let tags = includes
            .paths()
            .iter()
            .map(|path| format!("<script src=\"{path}\"></script>"))
            .collect::<Vec<_>>()
            .join("\n");
        out = out.replace(INCLUDE_FILES_MARKER, &tags);
    }

    if out.contains(RUNTIME_OPTIONS_MARKER) {
        let payload = if runtime_options_payload.is_empty() {
            "{}"
        } else {
            runtime_options_payload
        };
        out = out.replace(RUNTIME_OPTIONS_MARKER, payload);
    }

    out
}

/// Load the template at `template_path`, substitute, and write the
/// result as `index.html` under the export directory. The template path
/// is a parameter on purpose — every rendering backend ships its own
/// shell but assembles it the same way.
pub fn assemble_index_file(
    fs: &dyn FileSystem,
    template_path: &Path,
    export_dir: &Path,
    includes: &IncludeList,
    runtime_options_payload: &str,
) -> Result<()> {
    let template = fs
        .read_text(template_path)
        .map_err(|_| ExportError::Template(template_path.to_path_buf()))?;

    let assembled = complete_index_file(&template, includes, runtime_options_payload);
    fs.write_text(&export_dir.join(INDEX_FILE), &assembled)
}
