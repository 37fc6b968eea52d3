//! Electron packaging: manifest plus the entry script for the desktop
//! shell.

use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::project::Project;

/// Write the `main.js` entry script and then the `package.json`
/// manifest. The entry script opens the assembled `index.html`, so both
/// are only emitted once the web bundle exists.
pub fn export_electron_files(fs: &dyn FileSystem, project: &Project, export_dir: &Path) -> Result<()> {
    let entry = format!(
        r#"const {{ app, BrowserWindow }} = require('electron');

app.whenReady().then(() => {{
  const win = new BrowserWindow({{
    width: 1280,
    height: 720,
    title: {title},
    useContentSize: true,
    webPreferences: {{ contextIsolation: true }},
  }});
  win.setMenuBarVisibility(false);
  win.loadFile('index.html');
}});

app.on('window-all-closed', () => {{
  app.quit();
}});
"#,
        title = serde_json::to_string(&project.name).unwrap_or_else(|_| "\"game\"".into()),
    );
    fs.write_text(&export_dir.join("main.js"), &entry)?;

    let manifest = json!({
        "name": project.package_name,
        "productName": project.name,
        "version": project.version,
        "author": project.author,
        "main": "main.js",
    });
    let manifest = serde_json::to_string_pretty(&manifest).expect("manifest is valid json");
    fs.write_text(&export_dir.join("package.json"), &manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    #[test]
    fn emits_entry_script_and_manifest() {
        let fs = MemoryFileSystem::new();
        let project: Project = serde_json::from_str(
            r#"{ "name": "Demo \"Deluxe\"", "scenes": [{ "name": "Main" }] }"#,
        )
        .unwrap();

        export_electron_files(&fs, &project, Path::new("/out")).unwrap();

        let entry = fs.read_text(Path::new("/out/main.js")).unwrap();
        assert!(entry.contains("loadFile('index.html')"));
        assert!(entry.contains(r#"title: "Demo \"Deluxe\"""#));

        let manifest: serde_json::Value =
            serde_json::from_str(&fs.read_text(Path::new("/out/package.json")).unwrap()).unwrap();
        assert_eq!(manifest["main"], "main.js");
        assert_eq!(manifest["productName"], "Demo \"Deluxe\"");
    }
}
