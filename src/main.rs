use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use stage_exporter::codegen::PrecompiledCodeLoader;
use stage_exporter::fs::LocalFileSystem;
use stage_exporter::project::Project;
use stage_exporter::server::{run_preview_server, watch_project_file};
use stage_exporter::{BundleExportOptions, Exporter, PreviewExportOptions, Target};

#[derive(Parser)]
#[command(name = "stage", version)]
#[command(about = "STAGE — export interactive scene projects to deployable bundles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a full deployable bundle for a target
    Export {
        /// Project description file (JSON)
        #[arg(long)]
        project: PathBuf,

        /// Export directory
        #[arg(long, default_value = "dist")]
        out: PathBuf,

        /// Deployment target
        #[arg(long, value_enum, default_value_t = TargetArg::Web)]
        target: TargetArg,

        /// Merge and compress all includes into a single code.js
        #[arg(long)]
        minify: bool,

        /// Debug variant for targets that have one
        #[arg(long)]
        debug: bool,

        /// Directory holding the precompiled events code
        #[arg(long = "events-code")]
        events_code: Option<PathBuf>,

        /// Root of the runtime distribution (libraries and templates)
        #[arg(long = "runtime-root", default_value = "runtime")]
        runtime_root: PathBuf,
    },

    /// Export a fast preview and optionally serve it with hot re-export
    Preview {
        /// Project description file (JSON)
        #[arg(long)]
        project: PathBuf,

        /// Export directory
        #[arg(long, default_value = "preview")]
        out: PathBuf,

        /// Scene to run first (project default when omitted)
        #[arg(long)]
        scene: Option<String>,

        /// External layout to instantiate at startup
        #[arg(long = "external-layout")]
        external_layout: Option<String>,

        /// Refresh the project data only, skip code generation
        #[arg(long = "data-only")]
        data_only: bool,

        /// Debugger server host the preview should reach out to
        #[arg(long = "debugger-host")]
        debugger_host: Option<String>,

        /// Debugger server port
        #[arg(long = "debugger-port")]
        debugger_port: Option<u16>,

        /// Serve the preview and re-export on project changes
        #[arg(long)]
        watch: bool,

        /// Server port (with --watch)
        #[arg(long, default_value_t = 3939)]
        port: u16,

        /// Directory holding the precompiled events code
        #[arg(long = "events-code")]
        events_code: Option<PathBuf>,

        /// Root of the runtime distribution (libraries and templates)
        #[arg(long = "runtime-root", default_value = "runtime")]
        runtime_root: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    /// Plain browser bundle
    Web,
    /// Cordova installable mobile shell
    Cordova,
    /// Electron desktop shell
    Electron,
    /// Facebook Instant Games hosted bundle
    FacebookInstant,
    /// Cocos2d renderer bundle
    Cocos,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Web => Target::Web,
            TargetArg::Cordova => Target::Cordova,
            TargetArg::Electron => Target::Electron,
            TargetArg::FacebookInstant => Target::FacebookInstant,
            TargetArg::Cocos => Target::Cocos,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Export {
            project,
            out,
            target,
            minify,
            debug,
            events_code,
            runtime_root,
        } => run_export(&project, &out, target.into(), minify, debug, events_code, &runtime_root),
        Commands::Preview {
            project,
            out,
            scene,
            external_layout,
            data_only,
            debugger_host,
            debugger_port,
            watch,
            port,
            events_code,
            runtime_root,
        } => run_preview(PreviewArgs {
            project,
            out,
            scene,
            external_layout,
            data_only,
            debugger_host,
            debugger_port,
            watch,
            port,
            events_code,
            runtime_root,
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn load_project(path: &Path) -> anyhow::Result<(Project, PathBuf)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read project file '{}'", path.display()))?;
    let project: Project = serde_json::from_str(&text)
        .with_context(|| format!("invalid project file '{}'", path.display()))?;
    let project_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((project, project_dir))
}

fn events_code_dir(explicit: Option<PathBuf>, project_dir: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| project_dir.join("events-code"))
}

fn run_export(
    project_file: &Path,
    out: &Path,
    target: Target,
    minify: bool,
    debug: bool,
    events_code: Option<PathBuf>,
    runtime_root: &Path,
) -> anyhow::Result<()> {
    let (mut project, project_dir) = load_project(project_file)?;
    let generator = PrecompiledCodeLoader::new(events_code_dir(events_code, &project_dir));

    let fs = LocalFileSystem;
    let code_dir = std::env::temp_dir().join("stage-codegen");
    let exporter = Exporter::new(&fs, runtime_root, &code_dir).with_project_dir(&project_dir);

    let options = BundleExportOptions::new(out, target)
        .minified(minify)
        .debug_mode(debug);
    let report = exporter.export_bundle(&mut project, &generator, &options)?;

    eprintln!(
        "exported '{}' to {} ({} include files)",
        project.name,
        out.display(),
        report.includes.len()
    );
    Ok(())
}

struct PreviewArgs {
    project: PathBuf,
    out: PathBuf,
    scene: Option<String>,
    external_layout: Option<String>,
    data_only: bool,
    debugger_host: Option<String>,
    debugger_port: Option<u16>,
    watch: bool,
    port: u16,
    events_code: Option<PathBuf>,
    runtime_root: PathBuf,
}

impl PreviewArgs {
    fn export_options(
        &self,
        hashes: BTreeMap<String, u64>,
        data_only: bool,
    ) -> anyhow::Result<PreviewExportOptions> {
        let mut options = PreviewExportOptions::new(&self.out)
            .project_data_only(data_only)
            .with_include_file_hashes(hashes);
        if let Some(scene) = &self.scene {
            options = options.with_scene_name(scene);
        }
        if let Some(layout) = &self.external_layout {
            options = options.with_external_layout_name(layout);
        }
        if let (Some(host), Some(port)) = (&self.debugger_host, self.debugger_port) {
            options = options.with_debugger(host.clone(), port)?;
        }
        Ok(options)
    }
}

fn run_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let (mut project, project_dir) = load_project(&args.project)?;
    let generator =
        PrecompiledCodeLoader::new(events_code_dir(args.events_code.clone(), &project_dir));

    let fs = LocalFileSystem;
    let code_dir = std::env::temp_dir().join("stage-codegen");
    let exporter = Exporter::new(&fs, &args.runtime_root, &code_dir).with_project_dir(&project_dir);

    let options = args.export_options(BTreeMap::new(), args.data_only)?;
    let report = exporter.export_project_for_preview(&mut project, &generator, &options)?;
    eprintln!(
        "preview exported to {} ({} include files, {} generated)",
        args.out.display(),
        report.includes.len(),
        report.generated_code_files
    );

    if !args.watch {
        return Ok(());
    }

    // serve in the background, re-export in the foreground on change
    let serve_dir = args.out.clone();
    let port = args.port;
    std::thread::spawn(move || {
        if let Err(e) = run_preview_server(&LocalFileSystem, &serve_dir, port) {
            eprintln!("error: preview server failed: {e}");
            process::exit(1);
        }
    });
    eprintln!("previewing on http://127.0.0.1:{port}/ — watching for changes");

    let baseline = Arc::new(Mutex::new(report.include_file_hashes));
    let project_file = args.project.clone();
    watch_project_file(&project_file, || {
        let hashes = baseline.lock().unwrap().clone();
        let rerun = || -> anyhow::Result<BTreeMap<String, u64>> {
            let (mut project, _) = load_project(&project_file)?;
            let options = args.export_options(hashes.clone(), args.data_only)?;
            let report = exporter.export_project_for_preview(&mut project, &generator, &options)?;
            Ok(report.include_file_hashes)
        };
        match rerun() {
            Ok(new_hashes) => {
                *baseline.lock().unwrap() = new_hashes;
                eprintln!("re-exported preview");
            }
            Err(e) => eprintln!("error: re-export failed: {e:#}"),
        }
    })
    .map_err(|e| anyhow::anyhow!("watcher failed: {e}"))?;

    Ok(())
}
