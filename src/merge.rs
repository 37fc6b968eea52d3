//! Include merging.
//!
//! Makes every include physically present under the export directory:
//! relative entries are copied from the runtime root, absolute entries
//! (typically freshly generated code files) are copied in and rewritten
//! to their export-relative name. With minification requested, the whole
//! set is concatenated in list order into a single `code.js` artifact
//! that replaces the list.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{ExportError, Result};
use crate::fs::FileSystem;
use crate::includes::{content_hash, IncludeList};
use crate::options::CancelToken;

/// Name of the merged artifact when minification is requested.
pub const MERGED_ARTIFACT: &str = "code.js";

/// Copy every include into `export_dir`, rewrite absolute entries to
/// export-relative paths, then optionally merge the set into one file.
///
/// `baseline_hashes` maps export-relative paths to the content hash of
/// the previous export; a file whose hash is unchanged and whose
/// destination already exists is not rewritten. Concatenation order is
/// include order — top-level definitions must execute before their uses.
pub fn export_includes_and_libs(
    fs: &dyn FileSystem,
    runtime_root: &Path,
    includes: &mut IncludeList,
    export_dir: &Path,
    minify: bool,
    baseline_hashes: &BTreeMap<String, u64>,
    cancel: &CancelToken,
) -> Result<()> {
    fs.mkdir_all(export_dir)?;

    // export-relative destination -> source it was written from
    let mut written: HashMap<String, PathBuf> = HashMap::new();

    let entries: Vec<String> = includes.paths().iter().map(|s| s.to_string()).collect();
    for entry in entries {
        cancel.check()?;

        let declared = PathBuf::from(&entry);
        let (source, export_relative) = if fs.is_absolute(&declared) {
            let file_name = declared
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| ExportError::SourceNotFound(declared.clone()))?;
            (declared.clone(), file_name)
        } else {
            (runtime_root.join(&declared), entry.clone())
        };

        if let Some(previous) = written.get(&export_relative) {
            if previous != &source {
                return Err(ExportError::Collision {
                    path: export_relative,
                });
            }
        }

        let content = fs.read_text(&source)?;
        let hash = content_hash(&content);

        let destination = export_dir.join(&export_relative);
        if let Some(parent) = destination.parent() {
            fs.mkdir_all(parent)?;
        }

        let unchanged =
            baseline_hashes.get(&export_relative) == Some(&hash) && fs.exists(&destination);
        if unchanged {
            debug!("include {export_relative} unchanged, skipping copy");
        } else {
            fs.write_text(&destination, &content)?;
        }
        written.insert(export_relative.clone(), source);

        if export_relative != entry {
            includes.rewrite(&entry, export_relative.clone());
        }
        includes.set_hash(&export_relative, hash);
    }

    if minify {
        merge_into_single_artifact(fs, includes, export_dir)?;
    }

    Ok(())
}

/// Concatenate the whole include set, in list order, into `code.js` and
/// replace the list with that single entry. Either the merge fully
/// succeeds and the list is rewritten, or it fails and the list (and
/// everything already on disk) is left as-is.
fn merge_into_single_artifact(
    fs: &dyn FileSystem,
    includes: &mut IncludeList,
    export_dir: &Path,
) -> Result<()> {
    let mut merged = String::new();
    for entry in includes.iter() {
        let content = fs.read_text(&export_dir.join(&entry.path))?;
        merged.push_str(&compress_source(&content));
        if !merged.ends_with('\n') {
            merged.push('\n');
        }
    }

    let artifact = export_dir.join(MERGED_ARTIFACT);
    fs.write_text(&artifact, &merged)?;
    debug!("merged {} includes into {MERGED_ARTIFACT}", includes.len());

    includes.replace_with_single(MERGED_ARTIFACT, Some(content_hash(&merged)));
    Ok(())
}

/// Conservative size compression: drops blank lines, whole-line `//`
/// comments and trailing whitespace. Statement order and semantics are
/// untouched.
fn compress_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.trim_start().starts_with("//") {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    out
}
