//! The in-memory project description consumed by the pipeline.
//!
//! The exporter treats a [`Project`] as already validated: scenes,
//! external event sheets and resources come straight from the editor's
//! serialized form. The only mutation the pipeline performs is rewriting
//! resource file paths to their exported locations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// Reverse-DNS identifier used by the mobile and desktop shells.
    #[serde(default = "default_package_name")]
    pub package_name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub orientation: Orientation,
    /// Scene to launch first when none is requested explicitly.
    #[serde(default)]
    pub first_scene: Option<String>,
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub external_events: Vec<ExternalEvents>,
    /// Hand-written source files shipped alongside the generated code.
    #[serde(default)]
    pub external_source_files: Vec<ExternalSourceFile>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Include files declared by the objects, behaviors and effects the
    /// project uses. Already ordered by the editor.
    #[serde(default)]
    pub extension_include_files: Vec<String>,
    /// Font files referenced through the deprecated per-object font
    /// declaration, before font resources existed.
    #[serde(default)]
    pub legacy_font_files: Vec<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_package_name() -> String {
    "com.example.game".to_string()
}

impl Project {
    /// The scene the preview should start on when the caller names none.
    pub fn default_scene_name(&self) -> Option<&str> {
        self.first_scene
            .as_deref()
            .or_else(|| self.scenes.first().map(|s| s.name.as_str()))
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
}

/// An external event sheet, compiled like a scene but instantiable from
/// any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalEvents {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalSourceFile {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    /// Project-relative or absolute path to the source file. Rewritten to
    /// the export-relative path by the resource exporter.
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Audio,
    Font,
    Video,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Default,
    Landscape,
    Portrait,
}

impl Orientation {
    /// The value the mobile shell manifest expects.
    pub fn manifest_value(self) -> &'static str {
        match self {
            Orientation::Default => "default",
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_project_deserializes_with_defaults() {
        let project: Project = serde_json::from_str(
            r#"{ "name": "Demo", "scenes": [{ "name": "Main" }] }"#,
        )
        .unwrap();
        assert_eq!(project.version, "1.0.0");
        assert_eq!(project.package_name, "com.example.game");
        assert_eq!(project.orientation, Orientation::Default);
        assert_eq!(project.default_scene_name(), Some("Main"));
    }

    #[test]
    fn first_scene_overrides_list_order() {
        let project: Project = serde_json::from_str(
            r#"{
                "name": "Demo",
                "first_scene": "Title",
                "scenes": [{ "name": "Main" }, { "name": "Title" }]
            }"#,
        )
        .unwrap();
        assert_eq!(project.default_scene_name(), Some("Title"));
    }
}
