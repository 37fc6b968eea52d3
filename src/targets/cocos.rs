//! Cocos2d packaging: the alternate renderer's own bootstrap files.

use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::includes::IncludeList;

/// Write the Cocos bootstrap `main.js` and then `project.json`, which
/// lists every include in load order and carries the debug/release
/// switch.
pub fn export_cocos_files(
    fs: &dyn FileSystem,
    export_dir: &Path,
    debug_mode: bool,
    includes: &IncludeList,
) -> Result<()> {
    let bootstrap = r#"cc.game.onStart = function () {
  cc.view.adjustViewPort(true);
  cc.view.resizeWithBrowserSize(true);
  window.runtimeGame.start();
};
cc.game.run();
"#;
    fs.write_text(&export_dir.join("main.js"), bootstrap)?;

    let manifest = json!({
        "project_type": "javascript",
        "debugMode": if debug_mode { 1 } else { 0 },
        "showFPS": debug_mode,
        "frameRate": 60,
        "jsList": includes.paths(),
    });
    let manifest = serde_json::to_string_pretty(&manifest).expect("manifest is valid json");
    fs.write_text(&export_dir.join("project.json"), &manifest)
}
