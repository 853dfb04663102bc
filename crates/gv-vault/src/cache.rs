//! The plaintext cache: a non-committed mirror of a vault's contents.
//!
//! ```text
//! <repo>/.git-vault/cache/<vault>/
//!     content/      # plaintext mirror
//!     state.hash    # copy of the vault state hash current when written
//! ```
//!
//! A cache is trusted only when its stored hash equals the vault's state
//! hash AND a fresh re-digest of `content/` equals that same hash. Anything
//! less and it is destroyed and rebuilt from a full replay.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use gv_core::{GvResult, VAULT_DIR};
use gv_crypto::digest::{digest_dir, digest_to_hex, list_files};

#[derive(Debug)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    pub fn open(repo_root: &Path, vault_path: &str) -> Self {
        Self {
            root: repo_root.join(VAULT_DIR).join("cache").join(vault_path),
        }
    }

    fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    fn hash_path(&self) -> PathBuf {
        self.root.join("state.hash")
    }

    /// Two-sided validity check against the vault's current state hash.
    pub fn is_valid(&self, state_hash: &str) -> bool {
        let stored = match fs::read_to_string(self.hash_path()) {
            Ok(s) => s.trim().to_string(),
            Err(_) => return false,
        };
        if stored != state_hash {
            warn!(cache = %self.root.display(), "cache stored hash is stale");
            return false;
        }
        let content = self.content_dir();
        if !content.is_dir() {
            return false;
        }
        match digest_dir(&content) {
            Ok(digest) if digest_to_hex(&digest) == state_hash => true,
            Ok(_) => {
                warn!(cache = %self.root.display(), "cache content re-digest mismatch");
                false
            }
            Err(_) => false,
        }
    }

    /// Rewrite the cache from `src` and stamp it with `state_hash`.
    pub fn refresh_from(&self, src: &Path, state_hash: &str) -> GvResult<()> {
        self.destroy()?;
        mirror(src, &self.content_dir())?;
        fs::write(self.hash_path(), state_hash)?;
        debug!(cache = %self.root.display(), "cache refreshed");
        Ok(())
    }

    /// Copy the cached content into `target`, replacing its contents.
    pub fn copy_to(&self, target: &Path) -> GvResult<()> {
        mirror(&self.content_dir(), target)
    }

    /// Remove the cache entirely. Missing cache is not an error.
    pub fn destroy(&self) -> GvResult<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Make `dst` an exact content copy of `src`.
fn mirror(src: &Path, dst: &Path) -> GvResult<()> {
    if dst.exists() {
        fs::remove_dir_all(dst)?;
    }
    fs::create_dir_all(dst)?;
    for (rel, abs) in list_files(src)? {
        let dest = dst.join(&rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&abs, &dest)?;
    }
    Ok(())
}
