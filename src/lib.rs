//! STAGE — exports interactive scene projects to deployable bundles.
//!
//! The hard part is not rendering or gameplay, it is the build pipeline:
//! deciding which generated and static files a target needs, computing
//! their load order, merging them deterministically, rewriting the shell
//! template to reference them, and emitting target-specific packaging —
//! all without corrupting a previous successful export on failure.

pub mod codegen;
pub mod error;
pub mod fs;
pub mod includes;
pub mod merge;
pub mod options;
pub mod pipeline;
pub mod project;
pub mod resolver;
pub mod resources;
pub mod server;
pub mod targets;
pub mod template;

pub use error::{ExportError, Result};
pub use options::{BundleExportOptions, CancelToken, DebuggerAddress, PreviewExportOptions, Target};
pub use pipeline::{BundleExportReport, Exporter, ExportStage, PreviewExportReport};

#[cfg(test)]
mod integration_tests {
    use std::path::Path;

    use crate::codegen::{EventsCodeGenerator, GenerationError};
    use crate::fs::{FileSystem, MemoryFileSystem};
    use crate::options::PreviewExportOptions;
    use crate::pipeline::Exporter;
    use crate::project::{ExternalEvents, Project, Scene};
    use crate::resolver;
    use crate::ExportError;

    struct FakeGenerator;

    impl EventsCodeGenerator for FakeGenerator {
        fn generate_scene_code(
            &self,
            _project: &Project,
            scene: &Scene,
        ) -> std::result::Result<String, GenerationError> {
            Ok(format!("runtime.registerScene('{}');\n", scene.name))
        }

        fn generate_external_events_code(
            &self,
            _project: &Project,
            events: &ExternalEvents,
        ) -> std::result::Result<String, GenerationError> {
            Ok(format!("runtime.registerSheet('{}');\n", events.name))
        }
    }

    struct BrokenGenerator;

    impl EventsCodeGenerator for BrokenGenerator {
        fn generate_scene_code(
            &self,
            _project: &Project,
            scene: &Scene,
        ) -> std::result::Result<String, GenerationError> {
            Err(GenerationError(format!("no entry event in '{}'", scene.name)))
        }

        fn generate_external_events_code(
            &self,
            _project: &Project,
            _events: &ExternalEvents,
        ) -> std::result::Result<String, GenerationError> {
            Ok(String::new())
        }
    }

    fn seeded_runtime() -> MemoryFileSystem {
        let fs = MemoryFileSystem::new();
        for file in resolver::CORE_RUNTIME_FILES
            .iter()
            .chain(resolver::PIXI_RENDERER_FILES)
            .chain(resolver::DEBUGGER_CLIENT_FILES)
        {
            fs.seed(format!("/runtime/{file}"), &format!("// library {file}\nvar lib = true;\n"));
        }
        fs.seed(
            "/runtime/index.html",
            "<html>\n<!-- STAGE_INCLUDE_FILES -->\n<script>var o = /* STAGE_RUNTIME_OPTIONS */;</script>\n</html>",
        );
        fs
    }

    fn two_scene_project() -> Project {
        serde_json::from_str(
            r#"{ "name": "Demo", "scenes": [{ "name": "Main" }, { "name": "Boss" }] }"#,
        )
        .unwrap()
    }

    #[test]
    fn preview_export_produces_a_loadable_tree() {
        let fs = seeded_runtime();
        let mut project = two_scene_project();
        let exporter = Exporter::new(&fs, "/runtime", "/tmp/code");

        let report = exporter
            .export_project_for_preview(
                &mut project,
                &FakeGenerator,
                &PreviewExportOptions::new("/out"),
            )
            .unwrap();

        assert!(fs.exists(Path::new("/out/data.json")));
        assert!(fs.exists(Path::new("/out/code0.js")));
        assert!(fs.exists(Path::new("/out/code1.js")));
        assert!(fs.exists(Path::new("/out/index.html")));
        assert_eq!(report.generated_code_files, 2);

        // libraries come first, generated code last, in scene order
        let includes = &report.includes;
        let first_code = includes.iter().position(|p| p == "code0.js").unwrap();
        let second_code = includes.iter().position(|p| p == "code1.js").unwrap();
        assert!(first_code < second_code);
        assert!(includes[..first_code]
            .iter()
            .all(|p| !p.starts_with("code")));

        // the assembled shell references every include in order
        let index = fs.read_text(Path::new("/out/index.html")).unwrap();
        let mut last = 0;
        for include in includes {
            let tag = format!("<script src=\"{include}\"></script>");
            let at = index.find(&tag).unwrap_or_else(|| panic!("missing tag for {include}"));
            assert!(at >= last);
            last = at;
        }
    }

    #[test]
    fn no_debugger_means_no_debugger_includes() {
        let fs = seeded_runtime();
        let mut project = two_scene_project();
        let exporter = Exporter::new(&fs, "/runtime", "/tmp/code");

        let report = exporter
            .export_project_for_preview(
                &mut project,
                &FakeGenerator,
                &PreviewExportOptions::new("/out"),
            )
            .unwrap();

        assert!(report
            .includes
            .iter()
            .all(|p| !resolver::DEBUGGER_CLIENT_FILES.contains(&p.as_str())));
    }

    #[test]
    fn debugger_address_lands_in_the_shell_payload() {
        let fs = seeded_runtime();
        let mut project = two_scene_project();
        let exporter = Exporter::new(&fs, "/runtime", "/tmp/code");

        let options = PreviewExportOptions::new("/out")
            .with_debugger("127.0.0.1", 3030)
            .unwrap();
        let report = exporter
            .export_project_for_preview(&mut project, &FakeGenerator, &options)
            .unwrap();

        assert!(report
            .includes
            .iter()
            .any(|p| resolver::DEBUGGER_CLIENT_FILES.contains(&p.as_str())));
        let index = fs.read_text(Path::new("/out/index.html")).unwrap();
        assert!(index.contains("\"debuggerServerAddress\":\"127.0.0.1\""));
        assert!(index.contains("\"debuggerServerPort\":3030"));
    }

    #[test]
    fn data_only_export_rewrites_nothing_but_lists_code_files() {
        let fs = seeded_runtime();
        let mut project = two_scene_project();
        let exporter = Exporter::new(&fs, "/runtime", "/tmp/code");

        // first, a full export to produce the code files
        let report = exporter
            .export_project_for_preview(
                &mut project,
                &FakeGenerator,
                &PreviewExportOptions::new("/out"),
            )
            .unwrap();

        // mark the generated file so a rewrite would be visible
        fs.seed("/tmp/code/code0.js", "unchanged marker");
        fs.seed("/out/code0.js", "unchanged marker");

        let options = PreviewExportOptions::new("/out")
            .project_data_only(true)
            .with_include_file_hashes(report.include_file_hashes);
        let report = exporter
            .export_project_for_preview(&mut project, &FakeGenerator, &options)
            .unwrap();

        assert_eq!(report.generated_code_files, 0);
        assert!(report.includes.iter().any(|p| p == "code0.js"));
        assert_eq!(
            fs.read_text(Path::new("/tmp/code/code0.js")).unwrap(),
            "unchanged marker"
        );
    }

    #[test]
    fn failing_scene_aborts_before_the_shell_is_written() {
        let fs = seeded_runtime();
        let mut project = two_scene_project();
        let exporter = Exporter::new(&fs, "/runtime", "/tmp/code");

        let err = exporter
            .export_project_for_preview(
                &mut project,
                &BrokenGenerator,
                &PreviewExportOptions::new("/out"),
            )
            .unwrap_err();

        match err {
            ExportError::Generation { scene, .. } => assert_eq!(scene, "Main"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!fs.exists(Path::new("/out/index.html")));
    }
}
