//! Document read/write access
//!
//! The tab session reaches the file system only through `FileGateway`, so
//! tests can substitute a scripted implementation.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Request/response access to document contents.
pub trait FileGateway {
    /// Read the whole document at `path` as UTF-8 text.
    fn read_file(&self, path: &Path) -> Result<String>;

    /// Replace the document at `path` with `content`.
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;
}

/// `FileGateway` over the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGateway;

impl FileGateway for FsGateway {
    fn read_file(&self, path: &Path) -> Result<String> {
        debug!("Reading {}", path.display());
        fs::read_to_string(path).map_err(|e| Error::from_read(path, e))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        debug!("Writing {} bytes to {}", content.len(), path.display());
        fs::write(path, content).map_err(|e| Error::from_write(path, e))
    }
}

/// Open a URL or file with the system's default handler.
///
/// Used for hyperlinks activated in the viewer and for the print page.
pub fn open_external(target: &str) -> Result<()> {
    open::that(target).map_err(|source| Error::Unreachable {
        target: target.to_string(),
        source,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted Gateway (tests)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub use fake::FakeGateway;

#[cfg(test)]
mod fake {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory documents with per-path write denial and a read log.
    #[derive(Debug, Default)]
    pub struct FakeGateway {
        files: Mutex<HashMap<PathBuf, String>>,
        read_only: HashSet<PathBuf>,
        reads: Mutex<Vec<PathBuf>>,
    }

    impl FakeGateway {
        pub fn with_files(files: &[(&str, &str)]) -> Self {
            Self {
                files: Mutex::new(
                    files
                        .iter()
                        .map(|(p, c)| (PathBuf::from(p), c.to_string()))
                        .collect(),
                ),
                ..Self::default()
            }
        }

        pub fn deny_writes(mut self, path: &str) -> Self {
            self.read_only.insert(PathBuf::from(path));
            self
        }

        pub fn contents(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(Path::new(path)).cloned()
        }

        pub fn reads(&self) -> Vec<PathBuf> {
            self.reads.lock().unwrap().clone()
        }
    }

    impl FileGateway for FakeGateway {
        fn read_file(&self, path: &Path) -> Result<String> {
            self.reads.lock().unwrap().push(path.to_path_buf());
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    path: path.to_path_buf(),
                })
        }

        fn write_file(&self, path: &Path, content: &str) -> Result<()> {
            if self.read_only.contains(path) {
                return Err(Error::PermissionDenied {
                    path: path.to_path_buf(),
                });
            }
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_gateway_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");

        FsGateway.write_file(&path, "# Notes\n").unwrap();
        assert_eq!(FsGateway.read_file(&path).unwrap(), "# Notes\n");
    }

    #[test]
    fn test_fs_gateway_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.md");

        let err = FsGateway.read_file(&path).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_fs_gateway_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("a.md");

        let err = FsGateway.write_file(&path, "x").unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
    }

    #[test]
    fn test_fake_gateway_denies_writes() {
        let gateway = FakeGateway::with_files(&[("/a.md", "A")]).deny_writes("/a.md");
        assert!(gateway.write_file(Path::new("/a.md"), "B").is_err());
        assert_eq!(gateway.contents("/a.md").as_deref(), Some("A"));
    }
}
