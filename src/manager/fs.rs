//! Filesystem access used by the log manager
//!
//! The manager never touches `std::fs` directly; it goes through a
//! [`FileSystem`] so tests can inject failures.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Filesystem operations needed by the log manager
pub trait FileSystem: Send + Sync {
    /// Create a directory and all missing ancestors
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Append bytes to a file, creating it if absent
    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Read a whole file as raw bytes
    ///
    /// Returns `Ok(None)` if the file does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Whether a regular file exists at `path`
    fn is_file(&self, path: &Path) -> bool;

    /// Regular files directly under `dir`
    ///
    /// Returns an empty list if `dir` does not exist.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whether `a` and `b` resolve to the same existing file
    ///
    /// A path that does not exist is never the same file as another.
    fn is_same_file(&self, a: &Path, b: &Path) -> io::Result<bool>;

    /// Copy `from` to `to`, replacing any existing file at `to`
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Canonical form of `path`, or `None` if it does not exist
fn canonical(path: &Path) -> io::Result<Option<PathBuf>> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(Some(resolved)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// [`FileSystem`] backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        // O_APPEND plus a single write_all keeps each record contiguous
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(bytes)?;
        file.flush()
    }

    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn is_same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        match (canonical(a)?, canonical(b)?) {
            (Some(a), Some(b)) => Ok(a == b),
            _ => Ok(false),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_and_grows_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2026-02-11.log");

        OsFileSystem.append(&path, b"one\n").unwrap();
        OsFileSystem.append(&path, b"two\n").unwrap();

        let content = OsFileSystem.read(&path).unwrap();
        assert_eq!(content.as_deref(), Some(&b"one\ntwo\n"[..]));
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let content = OsFileSystem
            .read(&temp_dir.path().join("missing.log"))
            .unwrap();
        assert!(content.is_none());
    }

    #[test]
    fn test_list_files_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("nested.log")).unwrap();
        fs::write(temp_dir.path().join("2026-02-11.log"), "x").unwrap();

        let files = OsFileSystem.list_files(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("2026-02-11.log")]);
    }

    #[test]
    fn test_list_files_missing_dir() {
        let files = OsFileSystem
            .list_files(Path::new("/nonexistent/path/for/testing"))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_copy_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("a.log");
        let to = temp_dir.path().join("b.log");
        fs::write(&from, "new").unwrap();
        fs::write(&to, "old contents").unwrap();

        OsFileSystem.copy(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "new");
    }

    #[test]
    fn test_is_same_file_through_other_spellings() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("logs");
        fs::create_dir(&root).unwrap();
        let file = root.join("2026-02-11.log");
        fs::write(&file, "x").unwrap();

        let dotted = temp_dir.path().join("logs/../logs/2026-02-11.log");
        assert!(OsFileSystem.is_same_file(&file, &dotted).unwrap());
        assert!(!OsFileSystem.is_same_file(&file, &root.join("missing.log")).unwrap());

        let other = temp_dir.path().join("other.log");
        fs::write(&other, "x").unwrap();
        assert!(!OsFileSystem.is_same_file(&file, &other).unwrap());
    }
}
