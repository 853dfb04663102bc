//! Per-vault `lock`/`unlock` orchestration.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use gv_core::{GvError, GvResult, LockOutcome, UnlockOutcome};
use gv_crypto::digest::{digest_dir, digest_to_hex};
use gv_crypto::{aead, MasterKey};
use gv_patch::{encode_changeset, pack_dir, replay, synthesize};
use gv_store::{StoreLock, VaultStore};

use crate::cache::Cache;

/// One tracked directory and its encrypted store.
#[derive(Debug)]
pub struct Vault {
    vault_path: String,
    /// The plaintext working directory: `<repo_root>/<vault_path>`.
    work_dir: PathBuf,
    store: VaultStore,
    cache: Cache,
}

/// Read-only report for `status`.
#[derive(Debug, Clone)]
pub struct VaultStatus {
    pub vault_path: String,
    pub has_base: bool,
    pub patch_count: usize,
    pub state_hash: Option<String>,
    pub cache_valid: bool,
}

impl Vault {
    pub fn open(repo_root: &Path, vault_path: &str) -> GvResult<Self> {
        let store = VaultStore::open(repo_root, vault_path)?;
        Ok(Self {
            vault_path: vault_path.to_string(),
            work_dir: repo_root.join(vault_path),
            store,
            cache: Cache::open(repo_root, vault_path),
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Snapshot or append: make the encrypted store reflect the working
    /// directory. Idempotent when the tree is unchanged.
    pub fn lock(&self, key: &MasterKey) -> GvResult<LockOutcome> {
        let _guard = StoreLock::acquire(&self.store.state_hash_path())?;

        let digest = digest_to_hex(&digest_dir(&self.work_dir)?);

        if !self.store.has_base() {
            let archive = pack_dir(&self.work_dir)?;
            let nonce = aead::fresh_nonce();
            let ciphertext = aead::seal(key, &nonce, &archive)?;
            self.store.write_base(&ciphertext, &nonce)?;
            self.store.write_state_hash(&digest)?;
            self.cache.refresh_from(&self.work_dir, &digest)?;
            info!(vault = %self.vault_path, "base snapshot created");
            return Ok(LockOutcome::BaseCreated);
        }

        let previous = self.store.read_state_hash()?;
        if digest == previous {
            debug!(vault = %self.vault_path, "no change");
            return Ok(LockOutcome::NoChange);
        }

        // Diff against the reconstructed previous state; the scratch
        // directory is deleted on every exit path.
        let scratch = tempfile::tempdir()?;
        let prev_state = scratch.path().join("state");
        replay(&self.store, key, &prev_state)?;

        let records = synthesize(&prev_state, &self.work_dir)?;
        if records.is_empty() {
            warn!(vault = %self.vault_path, "digest changed but change set is empty");
            return Ok(LockOutcome::NoChange);
        }

        let changeset = encode_changeset(&records)?;
        let nonce = aead::fresh_nonce();
        let ciphertext = aead::seal(key, &nonce, changeset.as_bytes())?;
        let index = self.store.append_patch(&ciphertext, &nonce)?;
        self.store.write_state_hash(&digest)?;
        self.cache.refresh_from(&self.work_dir, &digest)?;
        info!(
            vault = %self.vault_path,
            index,
            records = records.len(),
            bytes = ciphertext.len(),
            "patch appended"
        );
        Ok(LockOutcome::PatchAppended(index))
    }

    /// Materialize the vault's current plaintext state into the working
    /// directory, from the cache when it proves itself, else by full replay.
    pub fn unlock(&self, key: &MasterKey) -> GvResult<UnlockOutcome> {
        if !self.store.has_base() {
            return Err(GvError::VaultMissing(self.vault_path.clone()));
        }
        let state_hash = self.store.read_state_hash()?;

        if self.cache.is_valid(&state_hash) {
            self.cache.copy_to(&self.work_dir)?;
            info!(vault = %self.vault_path, "restored from cache");
            return Ok(UnlockOutcome::FromCache);
        }

        // Replay into scratch and only mirror into the working directory
        // after the digest check has passed, so a failed replay leaves the
        // target untouched.
        self.cache.destroy()?;
        let scratch = tempfile::tempdir()?;
        let rebuilt = scratch.path().join("state");
        replay(&self.store, key, &rebuilt)?;

        self.cache.refresh_from(&rebuilt, &state_hash)?;
        self.cache.copy_to(&self.work_dir)?;
        info!(
            vault = %self.vault_path,
            patches = self.store.list_patches()?.len(),
            "restored by replay"
        );
        Ok(UnlockOutcome::Replayed)
    }

    /// Read-only health report; never mutates the vault or the cache.
    pub fn status(&self) -> GvResult<VaultStatus> {
        let has_base = self.store.has_base();
        let state_hash = if has_base {
            Some(self.store.read_state_hash()?)
        } else {
            None
        };
        let cache_valid = state_hash
            .as_deref()
            .map(|h| self.cache.is_valid(h))
            .unwrap_or(false);
        Ok(VaultStatus {
            vault_path: self.vault_path.clone(),
            has_base,
            patch_count: if has_base {
                self.store.list_patches()?.len()
            } else {
                0
            },
            state_hash,
            cache_valid,
        })
    }
}
