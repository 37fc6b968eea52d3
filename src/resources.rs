//! Resource export.
//!
//! Copies every resource the project references into the export tree and
//! rewrites the in-memory references to the exported relative paths.
//! Copies are content-compared, not existence-checked, so edited
//! resources are picked up on re-export while unchanged ones are
//! skipped.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::options::CancelToken;
use crate::project::{Project, Resource, ResourceKind};

/// Copy all project resources under `export_dir` and point the project's
/// resource references at the exported copies.
///
/// Relative source paths resolve against `project_dir` and keep their
/// relative layout in the export tree; absolute sources land under
/// `resources/` with their file name. Safe to run when resources are
/// already at their destination.
pub fn export_resources(
    fs: &dyn FileSystem,
    project: &mut Project,
    project_dir: &Path,
    export_dir: &Path,
    cancel: &CancelToken,
) -> Result<()> {
    fs.mkdir_all(export_dir)?;

    for resource in &mut project.resources {
        cancel.check()?;

        let declared = PathBuf::from(&resource.file);
        let (source, export_relative) = if fs.is_absolute(&declared) {
            let file_name = declared
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| resource.name.clone());
            (declared.clone(), format!("resources/{file_name}"))
        } else {
            (project_dir.join(&declared), normalize(&resource.file))
        };

        let destination = export_dir.join(&export_relative);
        if let Some(parent) = destination.parent() {
            fs.mkdir_all(parent)?;
        }

        if needs_copy(fs, &source, &destination)? {
            fs.copy(&source, &destination)?;
            debug!("exported resource '{}' -> {export_relative}", resource.name);
        }

        resource.file = export_relative;
    }

    Ok(())
}

/// Copy only when the destination is missing or its content differs.
fn needs_copy(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<bool> {
    if !fs.exists(destination) {
        return Ok(true);
    }
    let src = fs.read_binary(source)?;
    let dst = fs.read_binary(destination)?;
    Ok(src != dst)
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Pre-pass for the deprecated per-object font declaration: synthesize a
/// font resource entry for every legacy font file that has none.
/// Existing entries are never overwritten.
pub fn add_legacy_font_resources(project: &mut Project) {
    let legacy: Vec<String> = project.legacy_font_files.clone();
    for file in legacy {
        if file.is_empty() {
            continue;
        }
        let already_declared = project
            .resources
            .iter()
            .any(|r| r.kind == ResourceKind::Font && r.file == file);
        if already_declared {
            continue;
        }
        debug!("synthesizing font resource for legacy declaration '{file}'");
        project.resources.push(Resource {
            name: file.clone(),
            kind: ResourceKind::Font,
            file,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    fn project_with_resources() -> Project {
        serde_json::from_str(
            r#"{
                "name": "Demo",
                "scenes": [{ "name": "Main" }],
                "resources": [
                    { "name": "hero", "kind": "image", "file": "sprites/hero.png" },
                    { "name": "theme", "kind": "audio", "file": "/srv/shared/theme.ogg" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn copies_and_rewrites_references() {
        let fs = MemoryFileSystem::new();
        fs.seed("/project/sprites/hero.png", "png-bytes");
        fs.seed("/srv/shared/theme.ogg", "ogg-bytes");
        let mut project = project_with_resources();

        export_resources(
            &fs,
            &mut project,
            Path::new("/project"),
            Path::new("/out"),
            &CancelToken::new(),
        )
        .unwrap();

        assert!(fs.exists(Path::new("/out/sprites/hero.png")));
        assert!(fs.exists(Path::new("/out/resources/theme.ogg")));
        assert_eq!(project.resources[0].file, "sprites/hero.png");
        assert_eq!(project.resources[1].file, "resources/theme.ogg");
    }

    #[test]
    fn edited_resource_is_copied_again() {
        let fs = MemoryFileSystem::new();
        fs.seed("/project/sprites/hero.png", "new-bytes");
        fs.seed("/out/sprites/hero.png", "old-bytes");
        let mut project = project_with_resources();
        project.resources.truncate(1);

        export_resources(
            &fs,
            &mut project,
            Path::new("/project"),
            Path::new("/out"),
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(
            fs.read_text(Path::new("/out/sprites/hero.png")).unwrap(),
            "new-bytes"
        );
    }

    #[test]
    fn unchanged_resource_does_not_need_copy() {
        let fs = MemoryFileSystem::new();
        fs.seed("/project/a.png", "same");
        fs.seed("/out/a.png", "same");
        assert!(!needs_copy(&fs, Path::new("/project/a.png"), Path::new("/out/a.png")).unwrap());
    }

    #[test]
    fn legacy_fonts_are_synthesized_once() {
        let mut project: Project = serde_json::from_str(
            r#"{
                "name": "Demo",
                "scenes": [{ "name": "Main" }],
                "resources": [
                    { "name": "title-font", "kind": "font", "file": "fonts/title.ttf" }
                ],
                "legacy_font_files": ["fonts/title.ttf", "fonts/body.ttf"]
            }"#,
        )
        .unwrap();

        add_legacy_font_resources(&mut project);

        let fonts: Vec<_> = project
            .resources
            .iter()
            .filter(|r| r.kind == ResourceKind::Font)
            .collect();
        assert_eq!(fonts.len(), 2);
        // the pre-existing declaration kept its name
        assert_eq!(fonts[0].name, "title-font");
        assert_eq!(fonts[1].file, "fonts/body.ttf");
    }
}
