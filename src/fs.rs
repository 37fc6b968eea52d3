//! Abstract file system capability.
//!
//! Every pipeline stage goes through the [`FileSystem`] trait instead of
//! touching storage directly, so exports can run against the local disk
//! ([`LocalFileSystem`]) or fully in memory ([`MemoryFileSystem`], used by
//! tests and virtual exports).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ExportError, Result};

pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn read_text(&self, path: &Path) -> Result<String>;
    fn read_binary(&self, path: &Path) -> Result<Vec<u8>>;
    fn write_text(&self, path: &Path, content: &str) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
    fn mkdir_all(&self, path: &Path) -> Result<()>;
    fn is_absolute(&self, path: &Path) -> bool;
}

// ── Local disk ─────────────────────────────────────────────────────────

/// The real file system.
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|_| ExportError::SourceNotFound(path.to_path_buf()))
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|_| ExportError::SourceNotFound(path.to_path_buf()))
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).map_err(|e| ExportError::unwritable(path, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(ExportError::SourceNotFound(from.to_path_buf()));
        }
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| ExportError::unwritable(to, e))
    }

    fn mkdir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| ExportError::unwritable(path, e))
    }

    fn is_absolute(&self, path: &Path) -> bool {
        path.is_absolute()
    }
}

// ── In-memory ──────────────────────────────────────────────────────────

/// A virtual file system backed by a path→bytes map.
///
/// Directories are implicit: `mkdir_all` records them so `exists` answers
/// for them, but files can be written anywhere without one.
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            dirs: Mutex::new(Vec::new()),
        }
    }

    /// Seed a text file, creating or replacing it.
    pub fn seed(&self, path: impl Into<PathBuf>, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.as_bytes().to_vec());
    }

    /// All file paths currently stored, in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
            || self.dirs.lock().unwrap().iter().any(|d| d == path)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let files = self.files.lock().unwrap();
        let bytes = files
            .get(path)
            .ok_or_else(|| ExportError::SourceNotFound(path.to_path_buf()))?;
        String::from_utf8(bytes.clone())
            .map_err(|_| ExportError::SourceNotFound(path.to_path_buf()))
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ExportError::SourceNotFound(path.to_path_buf()))
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.as_bytes().to_vec());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let bytes = self.read_binary(from)?;
        self.files.lock().unwrap().insert(to.to_path_buf(), bytes);
        Ok(())
    }

    fn mkdir_all(&self, path: &Path) -> Result<()> {
        self.dirs.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn is_absolute(&self, path: &Path) -> bool {
        path.is_absolute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_round_trip() {
        let fs = MemoryFileSystem::new();
        fs.write_text(Path::new("/a/b.txt"), "hello").unwrap();
        assert!(fs.exists(Path::new("/a/b.txt")));
        assert_eq!(fs.read_text(Path::new("/a/b.txt")).unwrap(), "hello");
    }

    #[test]
    fn memory_fs_copy() {
        let fs = MemoryFileSystem::new();
        fs.seed("/src.js", "var x = 1;");
        fs.copy(Path::new("/src.js"), Path::new("/out/src.js")).unwrap();
        assert_eq!(fs.read_text(Path::new("/out/src.js")).unwrap(), "var x = 1;");
    }

    #[test]
    fn memory_fs_missing_source_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_text(Path::new("/missing")).unwrap_err();
        assert!(matches!(err, ExportError::SourceNotFound(_)));
    }
}
