//! Library include resolution.
//!
//! Decides which static runtime and renderer files belong in the include
//! list for a given configuration. The tables below are the load-order
//! contract, not discovered behavior: files that define runtime symbols
//! come before every file that references them, so the list reads
//! core → renderer → debugger client → generated game code.

use crate::includes::IncludeList;

/// Rendering backend baked into an export. Exactly one per export — the
/// choice is derived from the target, so requesting two at once is
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    Pixi,
    Cocos,
}

/// Runtime core, renderer-agnostic. Always first, in this order.
pub const CORE_RUNTIME_FILES: &[&str] = &[
    "libs/polyfills.js",
    "runtime/core-tools.js",
    "runtime/runtime-object.js",
    "runtime/runtime-behavior.js",
    "runtime/variables.js",
    "runtime/force.js",
    "runtime/timers.js",
    "runtime/runtime-scene.js",
    "runtime/scene-stack.js",
    "runtime/input-manager.js",
    "runtime/resource-loader.js",
    "runtime/runtime-game.js",
];

/// Pixi backend: the library itself, then the per-concern renderers.
pub const PIXI_RENDERER_FILES: &[&str] = &[
    "libs/pixi.js",
    "renderers/pixi/pixi-image-manager.js",
    "renderers/pixi/runtime-game-renderer.js",
    "renderers/pixi/runtime-scene-renderer.js",
    "renderers/pixi/layer-renderer.js",
    "renderers/pixi/sprite-renderer.js",
    "renderers/pixi/text-renderer.js",
];

/// Cocos2d backend, same shape as the Pixi table.
pub const COCOS_RENDERER_FILES: &[&str] = &[
    "libs/cocos2d-js.js",
    "renderers/cocos/cocos-image-manager.js",
    "renderers/cocos/runtime-game-renderer.js",
    "renderers/cocos/runtime-scene-renderer.js",
    "renderers/cocos/layer-renderer.js",
    "renderers/cocos/sprite-renderer.js",
    "renderers/cocos/text-renderer.js",
];

/// Live-inspection client, loaded after the runtime it instruments.
pub const DEBUGGER_CLIENT_FILES: &[&str] = &[
    "debugger/websocket-debugger-client.js",
    "debugger/hot-reloader.js",
];

fn renderer_files(renderer: Renderer) -> &'static [&'static str] {
    match renderer {
        Renderer::Pixi => PIXI_RENDERER_FILES,
        Renderer::Cocos => COCOS_RENDERER_FILES,
    }
}

/// Append the static library files for the given configuration: core
/// runtime, then the active renderer, then (optionally) the debugger
/// client. Deterministic per flag combination; duplicates are ignored by
/// the list itself.
pub fn add_lib_includes(renderer: Renderer, with_debugger_client: bool, includes: &mut IncludeList) {
    includes.extend(CORE_RUNTIME_FILES.iter().copied());
    add_renderer_includes(renderer, includes);
    if with_debugger_client {
        includes.extend(DEBUGGER_CLIENT_FILES.iter().copied());
    }
}

/// Append one renderer's files only.
pub fn add_renderer_includes(renderer: Renderer, includes: &mut IncludeList) {
    includes.extend(renderer_files(renderer).iter().copied());
}

/// Remove one renderer's files, preserving the relative order of every
/// other entry. Used when re-targeting an include list built for the
/// other backend.
pub fn remove_renderer_includes(renderer: Renderer, includes: &mut IncludeList) {
    let files = renderer_files(renderer);
    includes.remove_where(|path| files.contains(&path));
}
