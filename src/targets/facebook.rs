//! Facebook Instant Games packaging.
//!
//! The platform constraints live here as configuration: the bundle-size
//! ceiling and the domains the manifest may reference. The size check
//! runs over the files actually exported, after they all exist and
//! before the manifest is written.

use std::path::Path;

use serde_json::json;

use crate::error::{ExportError, Result};
use crate::fs::FileSystem;
use crate::includes::IncludeList;
use crate::project::Project;
use crate::template::INDEX_FILE;

/// Upload ceiling for a hosted bundle, per platform policy.
pub const INSTANT_GAMES_BUNDLE_LIMIT_BYTES: u64 = 15 * 1024 * 1024;

/// Domains a hosted bundle is allowed to reach out to.
pub const INSTANT_GAMES_ALLOWED_DOMAINS: &[&str] = &["fbcdn.net", "facebook.com"];

/// Enforce the platform constraints over the exported bundle, then write
/// `fbapp-config.json`.
pub fn export_facebook_instant_games_files(
    fs: &dyn FileSystem,
    project: &Project,
    export_dir: &Path,
    includes: &IncludeList,
) -> Result<()> {
    let mut bundle_size: u64 = 0;
    for entry in includes.iter() {
        bundle_size += fs.read_binary(&export_dir.join(&entry.path))?.len() as u64;
    }
    bundle_size += fs.read_binary(&export_dir.join(INDEX_FILE))?.len() as u64;

    if bundle_size > INSTANT_GAMES_BUNDLE_LIMIT_BYTES {
        return Err(ExportError::config(format!(
            "bundle is {bundle_size} bytes, above the Instant Games limit of {INSTANT_GAMES_BUNDLE_LIMIT_BYTES}"
        )));
    }

    let manifest = json!({
        "instant_games": {
            "platform_version": "RICH_GAMEPLAY",
            "navigation_menu_version": "NAV_FLOATING",
            "game_name": project.name,
            "orientation": project.orientation.manifest_value(),
            "allowed_domains": INSTANT_GAMES_ALLOWED_DOMAINS,
        }
    });
    let manifest = serde_json::to_string_pretty(&manifest).expect("manifest is valid json");
    fs.write_text(&export_dir.join("fbapp-config.json"), &manifest)
}
