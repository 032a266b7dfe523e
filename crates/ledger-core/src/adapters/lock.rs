//! # Chain File Lock
//!
//! Exclusive OS lock on a chain's data file, held for the lifetime of the
//! store. Uses `fs2` (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::errors::KVStoreError;

/// Exclusive lock on a chain data file.
///
/// Acquired on open, released on drop (RAII). The lock lives in a sidecar
/// `<data file>.lock` holding the owner's PID.
#[derive(Debug)]
pub struct ChainLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl ChainLock {
    /// Sidecar path used for the lock of `data_path`.
    pub fn lock_path_for(data_path: &Path) -> PathBuf {
        let mut name = data_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock for `data_path` without blocking.
    ///
    /// # Errors
    ///
    /// - `Locked`: Another process (or another store in this process)
    ///   holds the lock
    /// - `IOError`: The lock file could not be created or written
    pub fn acquire(data_path: &Path) -> Result<Self, KVStoreError> {
        let path = Self::lock_path_for(data_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            let holder = Self::read_existing_pid(&mut file);
            return Err(KVStoreError::Locked {
                message: match holder {
                    Some(pid) => format!("{} held by process {}", path.display(), pid),
                    None => format!("{} held by another process", path.display()),
                },
            });
        }

        let pid = std::process::id();
        file.set_len(0)?;
        writeln!(file, "{}", pid)?;
        file.sync_all()?;

        tracing::debug!(path = %path.display(), pid, "chain lock acquired");
        Ok(Self { file, path, pid })
    }

    /// PID written into the lock file.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(file: &mut File) -> Option<u32> {
        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;
        contents.trim().parse().ok()
    }
}

impl Drop for ChainLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        tracing::debug!(path = %self.path.display(), "chain lock released");
    }
}
