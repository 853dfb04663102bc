//! Advisory exclusive lock on a vault's `state.hash`.
//!
//! Concurrent `lock` invocations on the same vault are outside the contract;
//! this guard only makes them fail fast instead of interleaving writes.

use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;

use gv_core::{GvError, GvResult};

/// Holds the exclusive lock for its lifetime.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Acquire the lock, creating the file if it does not exist yet.
    ///
    /// Fails immediately with a `Store` error when another process holds it.
    pub fn acquire(path: &Path) -> GvResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        file.try_lock_exclusive().map_err(|_| {
            GvError::Store(format!(
                "vault is locked by another process: {}",
                path.display()
            ))
        })?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_exclusive_within_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.hash");

        let guard = StoreLock::acquire(&path).unwrap();
        assert!(StoreLock::acquire(&path).is_err());
        drop(guard);
        assert!(StoreLock::acquire(&path).is_ok());
    }

    #[test]
    fn creates_missing_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.hash");
        assert!(!path.exists());
        let _guard = StoreLock::acquire(&path).unwrap();
        assert!(path.exists());
    }
}
