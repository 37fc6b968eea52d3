//! Cordova packaging: the platform manifest for the installable mobile
//! shell.

use std::path::Path;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::project::Project;

/// Write `config.xml` parameterized with the project's identity,
/// version and orientation. Called after the web bundle is complete —
/// the manifest must never reference files that were not produced.
pub fn export_cordova_files(fs: &dyn FileSystem, project: &Project, export_dir: &Path) -> Result<()> {
    let config = format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<widget id="{id}" version="{version}" xmlns="http://www.w3.org/ns/widgets" xmlns:cdv="http://cordova.apache.org/ns/1.0">
    <name>{name}</name>
    <description>{name}, built with STAGE.</description>
    <author>{author}</author>
    <content src="index.html" />
    <access origin="*" />
    <preference name="Orientation" value="{orientation}" />
    <preference name="Fullscreen" value="true" />
    <preference name="DisallowOverscroll" value="true" />
</widget>
"#,
        id = xml_escape(&project.package_name),
        version = xml_escape(&project.version),
        name = xml_escape(&project.name),
        author = xml_escape(&project.author),
        orientation = project.orientation.manifest_value(),
    );

    fs.write_text(&export_dir.join("config.xml"), &config)
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::project::Orientation;

    fn sample_project() -> Project {
        serde_json::from_str(
            r#"{
                "name": "Cave <Runner>",
                "version": "2.1.0",
                "package_name": "com.fourda.caverunner",
                "author": "4DA Systems",
                "orientation": "landscape",
                "scenes": [{ "name": "Main" }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn manifest_carries_identity_and_orientation() {
        let fs = MemoryFileSystem::new();
        export_cordova_files(&fs, &sample_project(), Path::new("/out")).unwrap();

        let config = fs.read_text(Path::new("/out/config.xml")).unwrap();
        assert!(config.contains(r#"id="com.fourda.caverunner""#));
        assert!(config.contains(r#"version="2.1.0""#));
        assert!(config.contains("<name>Cave &lt;Runner&gt;</name>"));
        assert!(config.contains(r#"value="landscape""#));
        assert_eq!(Orientation::Landscape.manifest_value(), "landscape");
    }
}
