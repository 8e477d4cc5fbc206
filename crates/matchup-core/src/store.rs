//! File-backed [`KeyValueStore`]: one JSON object per profile file.
//!
//! Writes hold an exclusive advisory lock on `<file>.lock`, re-read the file
//! so concurrent `matchup` processes don't drop each other's keys, and land
//! through a temp file plus rename.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::ErrorCode;
use crate::ports::KeyValueStore;

/// How long a write waits for another process's lock.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Advisory lock errors for the profile file.
#[derive(Debug, thiserror::Error)]
pub enum StoreLockError {
    #[error("E5003: profile lock still held after {waited:?} at {}", .path.display())]
    Timeout { path: PathBuf, waited: Duration },
    #[error("E5002: profile lock could not be taken: {0}")]
    Io(#[from] io::Error),
}

impl StoreLockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::StoreWriteFailed,
        }
    }
}

#[derive(Debug)]
struct WriteGuard {
    file: File,
}

impl WriteGuard {
    fn acquire(path: &Path, timeout: Duration) -> Result<Self, StoreLockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let start = Instant::now();
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(path)?;

            if file.try_lock_exclusive().is_ok() {
                return Ok(Self { file });
            }

            if start.elapsed() >= timeout {
                return Err(StoreLockError::Timeout {
                    path: path.to_path_buf(),
                    waited: start.elapsed(),
                });
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Profile store persisted as a flat JSON object.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    timeout: Duration,
}

impl FileStore {
    /// Open (lazily) the store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self {
            path,
            lock_path,
            timeout: LOCK_TIMEOUT,
        }
    }

    /// Override the lock wait.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).with_context(|| {
            format!(
                "{}: failed to read {}",
                ErrorCode::StoreReadFailed,
                self.path.display()
            )
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).with_context(|| {
            format!(
                "{}: failed to parse {}",
                ErrorCode::StoreReadFailed,
                self.path.display()
            )
        })
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = WriteGuard::acquire(&self.lock_path, self.timeout)?;

        let mut entries = self.read_all()?;
        apply(&mut entries);

        let body = serde_json::to_string_pretty(&entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| {
            format!(
                "{}: failed to write {}",
                ErrorCode::StoreWriteFailed,
                tmp.display()
            )
        })?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "{}: failed to replace {}",
                ErrorCode::StoreWriteFailed,
                self.path.display()
            )
        })?;
        debug!(path = %self.path.display(), keys = entries.len(), "profile store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/profile.json");

        let mut store = FileStore::new(&path);
        store.set("userName", "Bilal").expect("set");
        store.set("volume", "0.5").expect("set");

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("userName").expect("get").as_deref(), Some("Bilal"));
        assert_eq!(reopened.get("volume").expect("get").as_deref(), Some("0.5"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn remove_on_missing_file_is_fine() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::new(dir.path().join("profile.json"));
        store.remove("userName").expect("remove");
        assert_eq!(store.get("userName").expect("get"), None);
    }

    #[test]
    fn two_handles_do_not_lose_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.json");
        let mut a = FileStore::new(&path);
        let mut b = FileStore::new(&path);
        a.set("userName", "Sana").expect("set");
        b.set("speechRate", "1.2").expect("set");
        assert_eq!(a.get("userName").expect("get").as_deref(), Some("Sana"));
        assert_eq!(a.get("speechRate").expect("get").as_deref(), Some("1.2"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.json");
        fs::write(&path, "not json").expect("write");
        let store = FileStore::new(&path);
        let err = store.get("userName").expect_err("corrupt");
        assert!(err.to_string().contains("E5001"));
    }

    #[test]
    fn held_lock_times_out() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.json");
        let mut store = FileStore::new(&path).with_timeout(Duration::from_millis(30));
        let _held =
            WriteGuard::acquire(&store.lock_path, Duration::from_millis(30)).expect("first lock");
        let err = store.set("userName", "Omar").expect_err("lock is held");
        let lock_err = err.downcast_ref::<StoreLockError>().expect("lock error");
        assert_eq!(lock_err.code(), ErrorCode::LockContention);
        assert!(lock_err.to_string().starts_with("E5003: profile lock still held"));
    }

    #[test]
    fn lock_io_errors_carry_write_code() {
        let err = StoreLockError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(err.code(), ErrorCode::StoreWriteFailed);
        assert_eq!(err.to_string(), "E5002: profile lock could not be taken: denied");
    }
}
