//! Target-specific packaging on top of the common pipeline.
//!
//! Each target composes the shared stages (resolve → generate → copy →
//! merge → assemble) and then emits its own artifacts. Manifest
//! generation is always the last step of a target, after every file the
//! manifest references exists.
//!
//! - `cordova` — installable mobile shell (`config.xml`)
//! - `electron` — desktop shell (`package.json` + entry script)
//! - `facebook` — Facebook Instant Games hosted bundle (`fbapp-config.json`)
//! - `cocos` — Cocos2d renderer bootstrap (`project.json` + `main.js`)

mod cocos;
mod cordova;
mod electron;
mod facebook;

pub use cocos::export_cocos_files;
pub use cordova::export_cordova_files;
pub use electron::export_electron_files;
pub use facebook::{export_facebook_instant_games_files, INSTANT_GAMES_BUNDLE_LIMIT_BYTES};
