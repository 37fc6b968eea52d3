//! Export options.
//!
//! One immutable options value per export, with named fields and enums
//! where the original design used positional booleans. Contradictory
//! combinations are caught here, before any file is touched.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ExportError, Result};
use crate::resolver::Renderer;

// ── Cancellation ───────────────────────────────────────────────────────

/// Cooperative cancellation flag, honored at per-scene and per-file
/// granularity inside the pipeline loops.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ExportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ── Preview ────────────────────────────────────────────────────────────

/// Debugger endpoint embedded into a preview so the running game reaches
/// back out over WebSockets.
#[derive(Debug, Clone)]
pub struct DebuggerAddress {
    pub host: String,
    pub port: u16,
}

impl DebuggerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(ExportError::config("debugger host must not be empty"));
        }
        if port == 0 {
            return Err(ExportError::config("debugger port must not be 0"));
        }
        Ok(Self { host, port })
    }

    pub fn websocket_url(&self) -> String {
        format!("ws://{}:{}/", self.host, self.port)
    }
}

/// Options for a preview export. Immutable once the export begins.
#[derive(Debug, Clone)]
pub struct PreviewExportOptions {
    pub export_dir: PathBuf,
    /// Scene to run first; the project default when `None`.
    pub scene_name: Option<String>,
    /// External layout to instantiate in the scene at startup.
    pub external_layout_name: Option<String>,
    pub debugger: Option<DebuggerAddress>,
    /// Last-known content hash per include file, supplied by a long-lived
    /// preview session to let unchanged files short-circuit.
    pub include_file_hashes: BTreeMap<String, u64>,
    /// Refresh the serialized project data only, skipping events code
    /// generation.
    pub project_data_only: bool,
    /// Previews are typically served unminified for fast hot-reload, but
    /// the same merge path applies when this is set.
    pub minify: bool,
    pub cancel: CancelToken,
}

impl PreviewExportOptions {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            scene_name: None,
            external_layout_name: None,
            debugger: None,
            include_file_hashes: BTreeMap::new(),
            project_data_only: false,
            minify: false,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_scene_name(mut self, name: impl Into<String>) -> Self {
        self.scene_name = Some(name.into());
        self
    }

    pub fn with_external_layout_name(mut self, name: impl Into<String>) -> Self {
        self.external_layout_name = Some(name.into());
        self
    }

    pub fn with_debugger(mut self, host: impl Into<String>, port: u16) -> Result<Self> {
        self.debugger = Some(DebuggerAddress::new(host, port)?);
        Ok(self)
    }

    /// Record the last-known hash of one include file.
    pub fn with_include_file_hash(mut self, file: impl Into<String>, hash: u64) -> Self {
        self.include_file_hashes.insert(file.into(), hash);
        self
    }

    pub fn with_include_file_hashes(mut self, hashes: BTreeMap<String, u64>) -> Self {
        self.include_file_hashes = hashes;
        self
    }

    pub fn project_data_only(mut self, enable: bool) -> Self {
        self.project_data_only = enable;
        self
    }

    pub fn minified(mut self, enable: bool) -> Self {
        self.minify = enable;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reject contradictory combinations before the pipeline starts.
    pub fn validate(&self) -> Result<()> {
        if self.project_data_only && self.minify {
            return Err(ExportError::config(
                "a project-data-only export cannot be minified: the code files it reuses are not regenerated",
            ));
        }
        Ok(())
    }
}

// ── Bundle ─────────────────────────────────────────────────────────────

/// Deployment shape of a full export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Plain browser bundle.
    Web,
    /// Cordova installable mobile shell.
    Cordova,
    /// Electron desktop shell.
    Electron,
    /// Facebook Instant Games hosted bundle.
    FacebookInstant,
    /// Cocos2d renderer bundle.
    Cocos,
}

impl Target {
    /// The rendering backend a target ships with. Deriving it here keeps
    /// "two renderers at once" unrepresentable.
    pub fn renderer(self) -> Renderer {
        match self {
            Target::Cocos => Renderer::Cocos,
            _ => Renderer::Pixi,
        }
    }
}

/// Options for a full (non-preview) export.
#[derive(Debug, Clone)]
pub struct BundleExportOptions {
    pub export_dir: PathBuf,
    pub target: Target,
    pub minify: bool,
    /// Debug variant for targets that have one (Cocos bootstrap).
    pub debug_mode: bool,
    pub cancel: CancelToken,
}

impl BundleExportOptions {
    pub fn new(export_dir: impl Into<PathBuf>, target: Target) -> Self {
        Self {
            export_dir: export_dir.into(),
            target,
            minify: false,
            debug_mode: false,
            cancel: CancelToken::new(),
        }
    }

    pub fn minified(mut self, enable: bool) -> Self {
        self.minify = enable;
        self
    }

    pub fn debug_mode(mut self, enable: bool) -> Self {
        self.debug_mode = enable;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}
