//! Events-code generation orchestration.
//!
//! The translation of visual event logic into JavaScript is an external
//! collaborator behind the [`EventsCodeGenerator`] trait. This module
//! drives it: one invocation per scene and per external event sheet,
//! output persisted as numbered files in the code-output directory and
//! registered in the include list. Generated file names are positional —
//! `code0.js` is always the first scene in the project — so regenerating
//! an unmodified project is byte-identical.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{ExportError, Result};
use crate::fs::FileSystem;
use crate::includes::{content_hash, IncludeList};
use crate::options::CancelToken;
use crate::project::{ExternalEvents, Project, Scene};

/// Failure reported by the external code generator. Carries the message
/// only; the orchestrator knows which scene was being generated.
#[derive(Debug)]
pub struct GenerationError(pub String);

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for GenerationError {}

/// The external code generator capability.
pub trait EventsCodeGenerator: Send + Sync {
    fn generate_scene_code(
        &self,
        project: &Project,
        scene: &Scene,
    ) -> std::result::Result<String, GenerationError>;

    fn generate_external_events_code(
        &self,
        project: &Project,
        events: &ExternalEvents,
    ) -> std::result::Result<String, GenerationError>;
}

/// Generate events code for every scene and external event sheet, write
/// the files and register them in the include list.
///
/// Scenes become `code{N}.js`, external event sheets `ext-code{N}.js`,
/// N being the position in the project's respective list. With
/// `data_only` set, nothing is generated or written but the file paths
/// are still appended — a fast data-only refresh reuses the code files
/// of the previous export.
///
/// A single failing scene aborts the whole export: partial code sets are
/// unusable because cross-scene symbol references may be unresolved.
pub fn export_events_code(
    fs: &dyn FileSystem,
    project: &Project,
    generator: &dyn EventsCodeGenerator,
    code_output_dir: &Path,
    includes: &mut IncludeList,
    data_only: bool,
    cancel: &CancelToken,
) -> Result<()> {
    fs.mkdir_all(code_output_dir)?;

    for (index, scene) in project.scenes.iter().enumerate() {
        cancel.check()?;
        let out_path = code_output_dir.join(format!("code{index}.js"));
        if data_only {
            includes.push(path_string(&out_path));
            continue;
        }
        let code = generator
            .generate_scene_code(project, scene)
            .map_err(|e| ExportError::generation(&scene.name, e))?;
        fs.write_text(&out_path, &code)?;
        debug!("generated {} for scene '{}'", out_path.display(), scene.name);
        includes.push_hashed(path_string(&out_path), content_hash(&code));
    }

    for (index, events) in project.external_events.iter().enumerate() {
        cancel.check()?;
        let out_path = code_output_dir.join(format!("ext-code{index}.js"));
        if data_only {
            includes.push(path_string(&out_path));
            continue;
        }
        let code = generator
            .generate_external_events_code(project, events)
            .map_err(|e| ExportError::generation(&events.name, e))?;
        fs.write_text(&out_path, &code)?;
        debug!(
            "generated {} for external events '{}'",
            out_path.display(),
            events.name
        );
        includes.push_hashed(path_string(&out_path), content_hash(&code));
    }

    Ok(())
}

/// Copy the project's hand-written source files into the code-output
/// directory as `src-code{N}.js` and register them. Relative filenames
/// resolve against the project directory.
pub fn export_external_source_files(
    fs: &dyn FileSystem,
    project: &Project,
    project_dir: &Path,
    code_output_dir: &Path,
    includes: &mut IncludeList,
    data_only: bool,
    cancel: &CancelToken,
) -> Result<()> {
    for (index, source_file) in project.external_source_files.iter().enumerate() {
        cancel.check()?;
        let out_path = code_output_dir.join(format!("src-code{index}.js"));
        if data_only {
            includes.push(path_string(&out_path));
            continue;
        }
        let source = PathBuf::from(&source_file.filename);
        let source = if fs.is_absolute(&source) {
            source
        } else {
            project_dir.join(&source)
        };
        let content = fs.read_text(&source)?;
        fs.write_text(&out_path, &content)?;
        includes.push_hashed(path_string(&out_path), content_hash(&content));
    }
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ── Disk-backed generator ──────────────────────────────────────────────

/// Generator that loads code produced earlier by the external event
/// compiler: `{scene name}.js` for scenes, `{sheet name}.ext.js` for
/// external event sheets, all under one directory. This is what the CLI
/// uses — the event compiler itself runs inside the editor.
pub struct PrecompiledCodeLoader {
    dir: PathBuf,
}

impl PrecompiledCodeLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load(&self, file_name: &str, what: &str) -> std::result::Result<String, GenerationError> {
        let path = self.dir.join(file_name);
        std::fs::read_to_string(&path).map_err(|e| {
            GenerationError(format!(
                "no precompiled code for {what} at '{}': {e}",
                path.display()
            ))
        })
    }
}

impl EventsCodeGenerator for PrecompiledCodeLoader {
    fn generate_scene_code(
        &self,
        _project: &Project,
        scene: &Scene,
    ) -> std::result::Result<String, GenerationError> {
        self.load(&format!("{}.js", scene.name), "scene")
    }

    fn generate_external_events_code(
        &self,
        _project: &Project,
        events: &ExternalEvents,
    ) -> std::result::Result<String, GenerationError> {
        self.load(&format!("{}.ext.js", events.name), "external events")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::project::Project;

    /// Deterministic generator used across the test suite.
    pub struct FakeGenerator;

    impl EventsCodeGenerator for FakeGenerator {
        fn generate_scene_code(
            &self,
            _project: &Project,
            scene: &Scene,
        ) -> std::result::Result<String, GenerationError> {
            Ok(format!("// scene {}\nruntime.register('{}');\n", scene.name, scene.name))
        }

        fn generate_external_events_code(
            &self,
            _project: &Project,
            events: &ExternalEvents,
        ) -> std::result::Result<String, GenerationError> {
            Ok(format!("// sheet {}\n", events.name))
        }
    }

    struct FailingGenerator {
        fail_on: &'static str,
    }

    impl EventsCodeGenerator for FailingGenerator {
        fn generate_scene_code(
            &self,
            _project: &Project,
            scene: &Scene,
        ) -> std::result::Result<String, GenerationError> {
            if scene.name == self.fail_on {
                Err(GenerationError("events graph has a cycle".into()))
            } else {
                Ok(String::new())
            }
        }

        fn generate_external_events_code(
            &self,
            _project: &Project,
            _events: &ExternalEvents,
        ) -> std::result::Result<String, GenerationError> {
            Ok(String::new())
        }
    }

    fn two_scene_project() -> Project {
        serde_json::from_str(
            r#"{
                "name": "Demo",
                "scenes": [{ "name": "Main" }, { "name": "Boss" }],
                "external_events": [{ "name": "Shared" }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn generates_numbered_files_in_project_order() {
        let fs = MemoryFileSystem::new();
        let project = two_scene_project();
        let mut includes = IncludeList::new();

        export_events_code(
            &fs,
            &project,
            &FakeGenerator,
            Path::new("/code"),
            &mut includes,
            false,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(
            includes.paths(),
            vec!["/code/code0.js", "/code/code1.js", "/code/ext-code0.js"]
        );
        assert!(fs.read_text(Path::new("/code/code0.js")).unwrap().contains("Main"));
        assert!(fs.read_text(Path::new("/code/code1.js")).unwrap().contains("Boss"));
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let fs = MemoryFileSystem::new();
        let project = two_scene_project();

        let mut first = IncludeList::new();
        export_events_code(&fs, &project, &FakeGenerator, Path::new("/code"), &mut first, false, &CancelToken::new()).unwrap();
        let round_one = fs.read_text(Path::new("/code/code0.js")).unwrap();

        let mut second = IncludeList::new();
        export_events_code(&fs, &project, &FakeGenerator, Path::new("/code"), &mut second, false, &CancelToken::new()).unwrap();
        let round_two = fs.read_text(Path::new("/code/code0.js")).unwrap();

        assert_eq!(round_one, round_two);
        assert_eq!(first.hashes(), second.hashes());
    }

    #[test]
    fn data_only_appends_paths_without_writing() {
        let fs = MemoryFileSystem::new();
        let project = two_scene_project();
        let mut includes = IncludeList::new();

        export_events_code(
            &fs,
            &project,
            &FakeGenerator,
            Path::new("/code"),
            &mut includes,
            true,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(includes.len(), 3);
        assert!(!fs.exists(Path::new("/code/code0.js")));
    }

    #[test]
    fn failing_scene_aborts_and_is_named() {
        let fs = MemoryFileSystem::new();
        let project = two_scene_project();
        let mut includes = IncludeList::new();

        let err = export_events_code(
            &fs,
            &project,
            &FailingGenerator { fail_on: "Boss" },
            Path::new("/code"),
            &mut includes,
            false,
            &CancelToken::new(),
        )
        .unwrap_err();

        match err {
            ExportError::Generation { scene, message } => {
                assert_eq!(scene, "Boss");
                assert!(message.contains("cycle"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cancellation_stops_the_loop() {
        let fs = MemoryFileSystem::new();
        let project = two_scene_project();
        let mut includes = IncludeList::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = export_events_code(
            &fs,
            &project,
            &FakeGenerator,
            Path::new("/code"),
            &mut includes,
            false,
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Cancelled));
        assert!(includes.is_empty());
    }
}
