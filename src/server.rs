//! Preview serving.
//!
//! A deliberately small loop: serve the export directory over HTTP and
//! watch the project file so the caller can re-run the preview pipeline
//! on change. The exporter itself stays oblivious to both — the preview
//! is just files on disk, and re-export is a whole-pipeline rerun that
//! leans on the baseline hash map to skip unchanged files.

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;

use log::{info, warn};
use notify::{RecursiveMode, Watcher};
use tiny_http::{Header, Response, Server};

use crate::fs::FileSystem;

/// Serve `export_dir` on `127.0.0.1:port` until the process ends.
/// `/` maps to `index.html`; unknown paths answer 404.
pub fn run_preview_server(
    fs: &dyn FileSystem,
    export_dir: &Path,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = Server::http(("127.0.0.1", port))?;
    info!("preview server listening on http://127.0.0.1:{port}/");

    for request in server.incoming_requests() {
        let Some(relative) = sanitize_url(request.url()) else {
            let _ = request.respond(Response::empty(404));
            continue;
        };

        let path = export_dir.join(&relative);
        match fs.read_binary(&path) {
            Ok(bytes) => {
                let mut response = Response::from_data(bytes);
                if let Some(mime) = content_type(&relative) {
                    if let Ok(header) =
                        Header::from_bytes(&b"Content-Type"[..], mime.as_bytes())
                    {
                        response = response.with_header(header);
                    }
                }
                let _ = request.respond(response);
            }
            Err(_) => {
                warn!("preview: 404 {}", relative.display());
                let _ = request.respond(Response::empty(404));
            }
        }
    }

    Ok(())
}

/// Watch the project file and invoke `on_change` for every modification
/// event. Blocks until the watcher channel closes.
pub fn watch_project_file(
    project_file: &Path,
    mut on_change: impl FnMut(),
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                let _ = tx.send(());
            }
        }
    })?;

    let watch_root = project_file.parent().unwrap_or(project_file);
    watcher.watch(watch_root, RecursiveMode::NonRecursive)?;
    info!("watching {} for changes", project_file.display());

    while rx.recv().is_ok() {
        // drain bursts so one save triggers one re-export
        while rx.try_recv().is_ok() {}
        on_change();
    }

    Ok(())
}

/// Map a request URL to a safe export-relative path. Rejects anything
/// that would escape the export directory.
fn sanitize_url(url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let trimmed = path.trim_start_matches('/');
    let relative = if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(trimmed)
    };

    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => return None,
        }
    }
    Some(relative)
}

fn content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    let mime = match ext {
        "html" => "text/html; charset=utf-8",
        "js" => "text/javascript",
        "json" => "application/json",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "ttf" => "font/ttf",
        "xml" => "application/xml",
        _ => return None,
    };
    Some(mime)
}
