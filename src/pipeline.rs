//! The export pipeline.
//!
//! [`Exporter`] is the facade a caller drives: pick options, hand over
//! the project and a code generator, get back a report or the first
//! error. Stages run strictly in sequence — each one depends on state
//! the previous one produced (the include list, rewritten resource
//! paths) — and the first failure short-circuits everything after it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde_json::json;

use crate::codegen::{export_events_code, export_external_source_files, EventsCodeGenerator};
use crate::error::{ExportError, Result};
use crate::fs::FileSystem;
use crate::includes::IncludeList;
use crate::merge::export_includes_and_libs;
use crate::options::{BundleExportOptions, PreviewExportOptions, Target};
use crate::project::Project;
use crate::resolver::{add_lib_includes, Renderer};
use crate::resources::{add_legacy_font_resources, export_resources};
use crate::targets;
use crate::template::assemble_index_file;

/// Default name of the serialized project document.
pub const PROJECT_DATA_FILE: &str = "data.json";

/// One step of an export attempt, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    DataExport,
    ResourceExport,
    CodeGeneration,
    IncludeMerge,
    TemplateAssembly,
    TargetPackaging,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStage::DataExport => "data export",
            ExportStage::ResourceExport => "resource export",
            ExportStage::CodeGeneration => "code generation",
            ExportStage::IncludeMerge => "include resolution and merge",
            ExportStage::TemplateAssembly => "template assembly",
            ExportStage::TargetPackaging => "target packaging",
        };
        write!(f, "{name}")
    }
}

/// What a successful preview export produced. The hash map feeds the
/// next incremental export as its baseline.
#[derive(Debug, Clone)]
pub struct PreviewExportReport {
    pub includes: Vec<String>,
    pub include_file_hashes: BTreeMap<String, u64>,
    pub generated_code_files: usize,
}

#[derive(Debug, Clone)]
pub struct BundleExportReport {
    pub target: Target,
    pub includes: Vec<String>,
}

/// Export facade. One instance drives one export at a time; concurrent
/// exports to the same directory must be serialized by the caller.
pub struct Exporter<'a> {
    fs: &'a dyn FileSystem,
    /// Root of the runtime distribution: library files and shell
    /// templates are resolved against it.
    runtime_root: PathBuf,
    /// Where generated events code lands before being merged into the
    /// export tree. Typically a temporary directory.
    code_output_dir: PathBuf,
    /// Directory the project's relative resource paths resolve against.
    project_dir: PathBuf,
}

impl<'a> Exporter<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        runtime_root: impl Into<PathBuf>,
        code_output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            runtime_root: runtime_root.into(),
            code_output_dir: code_output_dir.into(),
            project_dir: PathBuf::from("."),
        }
    }

    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    /// Change where generated code files are written.
    pub fn set_code_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.code_output_dir = dir.into();
    }

    /// Serialize the project and the runtime options payload to
    /// `filename`.
    pub fn export_project_data(
        fs: &dyn FileSystem,
        project: &Project,
        filename: &Path,
        runtime_options: &serde_json::Value,
    ) -> Result<()> {
        let document = json!({
            "project": project,
            "runtimeGameOptions": runtime_options,
        });
        let text = serde_json::to_string(&document)
            .map_err(|e| ExportError::unwritable(filename, e))?;
        fs.write_text(filename, &text)
    }

    // ── Preview ────────────────────────────────────────────────────────

    /// Run the preview pipeline: data → resources → code → includes →
    /// shell document. Returns the report the caller needs for the next
    /// incremental export. The preview is not launched — opening it is
    /// the caller's responsibility.
    pub fn export_project_for_preview(
        &self,
        project: &mut Project,
        generator: &dyn EventsCodeGenerator,
        options: &PreviewExportOptions,
    ) -> Result<PreviewExportReport> {
        options.validate()?;
        let scene_name = resolve_scene_name(project, options.scene_name.as_deref())?;
        let export_dir = options.export_dir.clone();

        add_legacy_font_resources(project);

        // DataExport always runs; the data-only flag controls code
        // generation, nothing else.
        self.run_stage(ExportStage::DataExport, || {
            self.fs.mkdir_all(&export_dir)?;
            let startup_options = json!({
                "isPreview": true,
                "scene": scene_name,
                "injectExternalLayout": options.external_layout_name.clone().unwrap_or_default(),
            });
            Self::export_project_data(
                self.fs,
                project,
                &export_dir.join(PROJECT_DATA_FILE),
                &startup_options,
            )
        })?;

        self.run_stage(ExportStage::ResourceExport, || {
            export_resources(
                self.fs,
                project,
                &self.project_dir,
                &export_dir,
                &options.cancel,
            )
        })?;

        let mut code_includes = IncludeList::new();
        self.run_stage(ExportStage::CodeGeneration, || {
            export_events_code(
                self.fs,
                project,
                generator,
                &self.code_output_dir,
                &mut code_includes,
                options.project_data_only,
                &options.cancel,
            )?;
            export_external_source_files(
                self.fs,
                project,
                &self.project_dir,
                &self.code_output_dir,
                &mut code_includes,
                options.project_data_only,
                &options.cancel,
            )
        })?;
        let generated_code_files = if options.project_data_only {
            0
        } else {
            code_includes.len()
        };

        let mut includes = IncludeList::new();
        self.run_stage(ExportStage::IncludeMerge, || {
            add_lib_includes(Renderer::Pixi, options.debugger.is_some(), &mut includes);
            includes.extend(project.extension_include_files.iter().cloned());
            for entry in code_includes.iter() {
                match entry.hash {
                    Some(hash) => includes.push_hashed(entry.path.clone(), hash),
                    None => includes.push(entry.path.clone()),
                };
            }
            export_includes_and_libs(
                self.fs,
                &self.runtime_root,
                &mut includes,
                &export_dir,
                options.minify,
                &options.include_file_hashes,
                &options.cancel,
            )
        })?;

        self.run_stage(ExportStage::TemplateAssembly, || {
            let payload = json!({
                "isPreview": true,
                "scene": scene_name,
                "injectExternalLayout": options.external_layout_name.clone().unwrap_or_default(),
                "debuggerServerAddress": options.debugger.as_ref().map(|d| d.host.clone()),
                "debuggerServerPort": options.debugger.as_ref().map(|d| d.port),
                "includeFileHashes": includes.hashes(),
                "projectDataOnlyExport": options.project_data_only,
            });
            assemble_index_file(
                self.fs,
                &self.runtime_root.join("index.html"),
                &export_dir,
                &includes,
                &payload.to_string(),
            )
        })?;

        info!("preview export complete: {} include files", includes.len());
        Ok(PreviewExportReport {
            include_file_hashes: includes.hashes(),
            includes: includes.paths().iter().map(|s| s.to_string()).collect(),
            generated_code_files,
        })
    }

    // ── Full bundles ───────────────────────────────────────────────────

    /// Run the full pipeline for a deployable bundle, then the target's
    /// own packaging.
    pub fn export_bundle(
        &self,
        project: &mut Project,
        generator: &dyn EventsCodeGenerator,
        options: &BundleExportOptions,
    ) -> Result<BundleExportReport> {
        let renderer = options.target.renderer();
        let export_dir = options.export_dir.clone();

        add_legacy_font_resources(project);

        self.run_stage(ExportStage::DataExport, || {
            self.fs.mkdir_all(&export_dir)?;
            let startup_options = json!({
                "isPreview": false,
                "scene": project.default_scene_name(),
            });
            Self::export_project_data(
                self.fs,
                project,
                &export_dir.join(PROJECT_DATA_FILE),
                &startup_options,
            )
        })?;

        self.run_stage(ExportStage::ResourceExport, || {
            export_resources(
                self.fs,
                project,
                &self.project_dir,
                &export_dir,
                &options.cancel,
            )
        })?;

        let mut code_includes = IncludeList::new();
        self.run_stage(ExportStage::CodeGeneration, || {
            export_events_code(
                self.fs,
                project,
                generator,
                &self.code_output_dir,
                &mut code_includes,
                false,
                &options.cancel,
            )?;
            export_external_source_files(
                self.fs,
                project,
                &self.project_dir,
                &self.code_output_dir,
                &mut code_includes,
                false,
                &options.cancel,
            )
        })?;

        let mut includes = IncludeList::new();
        self.run_stage(ExportStage::IncludeMerge, || {
            add_lib_includes(renderer, false, &mut includes);
            includes.extend(project.extension_include_files.iter().cloned());
            for entry in code_includes.iter() {
                match entry.hash {
                    Some(hash) => includes.push_hashed(entry.path.clone(), hash),
                    None => includes.push(entry.path.clone()),
                };
            }
            export_includes_and_libs(
                self.fs,
                &self.runtime_root,
                &mut includes,
                &export_dir,
                options.minify,
                &BTreeMap::new(),
                &options.cancel,
            )
        })?;

        self.run_stage(ExportStage::TemplateAssembly, || {
            let template = match renderer {
                Renderer::Pixi => self.runtime_root.join("index.html"),
                Renderer::Cocos => self.runtime_root.join("cocos/index.html"),
            };
            let payload = json!({
                "isPreview": false,
                "scene": project.default_scene_name(),
            });
            assemble_index_file(self.fs, &template, &export_dir, &includes, &payload.to_string())
        })?;

        self.run_stage(ExportStage::TargetPackaging, || match options.target {
            Target::Web => Ok(()),
            Target::Cordova => targets::export_cordova_files(self.fs, project, &export_dir),
            Target::Electron => targets::export_electron_files(self.fs, project, &export_dir),
            Target::FacebookInstant => targets::export_facebook_instant_games_files(
                self.fs,
                project,
                &export_dir,
                &includes,
            ),
            Target::Cocos => {
                targets::export_cocos_files(self.fs, &export_dir, options.debug_mode, &includes)
            }
        })?;

        info!(
            "bundle export complete ({:?}): {} include files",
            options.target,
            includes.len()
        );
        Ok(BundleExportReport {
            target: options.target,
            includes: includes.paths().iter().map(|s| s.to_string()).collect(),
        })
    }

    fn run_stage<T>(&self, stage: ExportStage, f: impl FnOnce() -> Result<T>) -> Result<T> {
        debug!("stage: {stage}");
        let result = f();
        if let Err(e) = &result {
            error!("stage '{stage}' failed: {e}");
        }
        result
    }
}

fn resolve_scene_name(project: &Project, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(name) => {
            if project.scene(name).is_none() {
                return Err(ExportError::config(format!(
                    "scene '{name}' does not exist in the project"
                )));
            }
            Ok(name.to_string())
        }
        None => project
            .default_scene_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ExportError::config("project has no scenes")),
    }
}
