//! Filesystem capability used by rotation and the writer.
//!
//! [`FsStore`] is the real filesystem. [`MemoryStore`] keeps files in a map and
//! can be told to fail specific operations.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use eventlog_core::LogError;

/// The handful of filesystem operations the logger needs.
pub trait FileStore: Send + Sync {
    /// Length of the file at `path`, or `Ok(None)` if it does not exist.
    fn probe(&self, path: &Path) -> io::Result<Option<u64>>;

    /// Make sure `dir` exists and is a directory.
    fn ensure_dir(&self, dir: &Path) -> Result<(), LogError>;

    /// Append `bytes` to `path` (creating it), flush, and return the new length.
    fn append(&self, path: &Path, bytes: &[u8]) -> Result<u64, LogError>;

    /// Names of the regular files directly inside `dir`.
    fn list(&self, dir: &Path) -> io::Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Real filesystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FileStore for FsStore {
    fn probe(&self, path: &Path) -> io::Result<Option<u64>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), LogError> {
        let unavailable = |source| LogError::DirectoryUnavailable {
            path: dir.to_path_buf(),
            source,
        };
        match fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(unavailable(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            ))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(dir).map_err(unavailable)?;
                set_dir_permissions(dir).map_err(unavailable)
            }
            Err(err) => Err(unavailable(err)),
        }
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> Result<u64, LogError> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LogError::FileOpen {
                path: path.to_path_buf(),
                source,
            })?;

        let write_err = |source| LogError::Write {
            path: path.to_path_buf(),
            source,
        };
        file.write_all(bytes).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        let len = file.metadata().map_err(write_err)?.len();
        Ok(len)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    probe_failures: HashSet<PathBuf>,
    fail_appends: bool,
    fail_dirs: bool,
}

/// Map-backed [`FileStore`]. Directories always exist unless
/// [`MemoryStore::fail_directories`] is set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.state().files.insert(path.into(), contents.into());
    }

    /// Create or replace a file with `len` filler bytes.
    pub fn fill(&self, path: impl Into<PathBuf>, len: usize) {
        self.insert(path, vec![b'x'; len]);
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.state()
            .files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.state().files.keys().cloned().collect()
    }

    /// Make every future `probe` of `path` fail with a permission error.
    pub fn fail_probe(&self, path: impl Into<PathBuf>) {
        self.state().probe_failures.insert(path.into());
    }

    pub fn fail_appends(&self, fail: bool) {
        self.state().fail_appends = fail;
    }

    pub fn fail_directories(&self, fail: bool) {
        self.state().fail_dirs = fail;
    }
}

impl FileStore for MemoryStore {
    fn probe(&self, path: &Path) -> io::Result<Option<u64>> {
        let state = self.state();
        if state.probe_failures.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "probe refused",
            ));
        }
        Ok(state.files.get(path).map(|bytes| bytes.len() as u64))
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), LogError> {
        if self.state().fail_dirs {
            return Err(LogError::DirectoryUnavailable {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        Ok(())
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> Result<u64, LogError> {
        let mut state = self.state();
        if state.fail_appends {
            return Err(LogError::FileOpen {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        let file = state.files.entry(path.to_path_buf()).or_default();
        file.extend_from_slice(bytes);
        Ok(file.len() as u64)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        Ok(self
            .state()
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fs_probe_reports_missing_as_none() {
        let dir = TempDir::new().unwrap();
        let probed = FsStore.probe(&dir.path().join("absent.txt")).unwrap();
        assert_eq!(probed, None);
    }

    #[test]
    fn fs_append_creates_and_grows_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events_log_2024-01-01.txt");
        assert_eq!(FsStore.append(&path, b"one\n").unwrap(), 4);
        assert_eq!(FsStore.append(&path, b"two\n").unwrap(), 8);
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
        assert_eq!(FsStore.probe(&path).unwrap(), Some(8));
    }

    #[test]
    fn fs_ensure_dir_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("a").join("logs");
        FsStore.ensure_dir(&logs).unwrap();
        assert!(logs.is_dir());
        // Second call is a no-op.
        FsStore.ensure_dir(&logs).unwrap();
    }

    #[test]
    fn fs_ensure_dir_rejects_regular_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("logs");
        fs::write(&file, "not a dir").unwrap();
        let err = FsStore.ensure_dir(&file).unwrap_err();
        assert!(matches!(err, LogError::DirectoryUnavailable { .. }), "got: {err}");
    }

    #[test]
    fn fs_append_into_missing_directory_is_open_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("x.txt");
        let err = FsStore.append(&path, b"x").unwrap_err();
        assert!(matches!(err, LogError::FileOpen { .. }), "got: {err}");
    }

    #[test]
    fn fs_list_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        assert_eq!(FsStore.list(dir.path()).unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn memory_store_injected_failures() {
        let store = MemoryStore::new();
        let path = PathBuf::from("/logs/x.txt");
        store.fail_probe(&path);
        assert!(store.probe(&path).is_err());

        store.fail_appends(true);
        assert!(matches!(
            store.append(Path::new("/logs/y.txt"), b"y"),
            Err(LogError::FileOpen { .. })
        ));

        store.fail_directories(true);
        assert!(store.ensure_dir(Path::new("/logs")).is_err());
    }

    #[test]
    fn memory_store_lists_direct_children_only() {
        let store = MemoryStore::new();
        store.insert("/logs/a.txt", "a");
        store.insert("/logs/nested/b.txt", "b");
        store.insert("/other/c.txt", "c");
        assert_eq!(store.list(Path::new("/logs")).unwrap(), vec!["a.txt"]);
    }
}
