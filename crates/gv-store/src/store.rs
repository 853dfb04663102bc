use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::debug;

use gv_core::{validate_vault_path, GvError, GvResult, VAULT_DIR};
use gv_crypto::aead::{nonce_from_hex, nonce_to_hex, Nonce};

pub const BASE_CIPHERTEXT: &str = "base.tar.gz.aes256gcm.enc";
pub const BASE_NONCE: &str = "base.nonce";
pub const STATE_HASH: &str = "state.hash";

const PATCH_SUFFIX: &str = ".patch.aes256gcm.enc";
const NONCE_SUFFIX: &str = ".nonce";

/// One entry of the ordered patch log.
#[derive(Debug, Clone)]
pub struct PatchEntry {
    /// 1-based patch index.
    pub index: u32,
    pub ciphertext_path: PathBuf,
    pub nonce_path: PathBuf,
}

/// Handle on one vault's committed artifact directory.
///
/// Opening a store creates the layout directories but writes no artifacts;
/// a store with no base file is a vault in the `Absent` state.
#[derive(Debug)]
pub struct VaultStore {
    data_dir: PathBuf,
}

impl VaultStore {
    /// Open (and create if needed) the store for `vault_path` under `repo_root`.
    pub fn open(repo_root: &Path, vault_path: &str) -> GvResult<Self> {
        validate_vault_path(vault_path)?;
        let data_dir = repo_root.join(VAULT_DIR).join("data").join(vault_path);
        fs::create_dir_all(data_dir.join("patches"))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn patches_dir(&self) -> PathBuf {
        self.data_dir.join("patches")
    }

    pub fn state_hash_path(&self) -> PathBuf {
        self.data_dir.join(STATE_HASH)
    }

    pub fn has_base(&self) -> bool {
        self.data_dir.join(BASE_CIPHERTEXT).exists()
    }

    /// Write the base snapshot. Refuses to overwrite an existing base: the
    /// base is immutable for the lifetime of the vault.
    pub fn write_base(&self, ciphertext: &[u8], nonce: &Nonce) -> GvResult<()> {
        if self.has_base() {
            return Err(GvError::Store(
                "base snapshot already exists and is immutable".into(),
            ));
        }
        write_atomic(&self.data_dir.join(BASE_NONCE), nonce_to_hex(nonce).as_bytes())?;
        write_atomic(&self.data_dir.join(BASE_CIPHERTEXT), ciphertext)?;
        debug!(dir = %self.data_dir.display(), bytes = ciphertext.len(), "base written");
        Ok(())
    }

    pub fn read_base(&self) -> GvResult<(Vec<u8>, Nonce)> {
        let ct_path = self.data_dir.join(BASE_CIPHERTEXT);
        if !ct_path.exists() {
            return Err(GvError::VaultMissing(self.data_dir.display().to_string()));
        }
        let ciphertext = fs::read(&ct_path)?;
        let nonce_raw = fs::read_to_string(self.data_dir.join(BASE_NONCE))?;
        Ok((ciphertext, nonce_from_hex(&nonce_raw)?))
    }

    /// Count the patches currently in the log and return the next free
    /// 1-based index.
    pub fn next_patch_index(&self) -> GvResult<u32> {
        Ok(self.list_patches()?.len() as u32 + 1)
    }

    /// Enumerate the patch log in index order.
    ///
    /// Enforces the layout invariants: indices must be contiguous from 1,
    /// and every ciphertext must have its nonce file.
    pub fn list_patches(&self) -> GvResult<Vec<PatchEntry>> {
        let dir = self.patches_dir();
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(stem) = name.strip_suffix(PATCH_SUFFIX) else {
                continue;
            };
            let index: u32 = stem.parse().map_err(|_| {
                GvError::Store(format!("unparseable patch file name: {name}"))
            })?;
            let nonce_path = dir.join(format!("{stem}{NONCE_SUFFIX}"));
            if !nonce_path.exists() {
                return Err(GvError::Store(format!(
                    "patch {index:03} has no nonce file"
                )));
            }
            entries.push(PatchEntry {
                index,
                ciphertext_path: entry.path(),
                nonce_path,
            });
        }
        entries.sort_by_key(|e| e.index);
        for (i, entry) in entries.iter().enumerate() {
            let expected = i as u32 + 1;
            if entry.index != expected {
                return Err(GvError::Store(format!(
                    "patch log has a gap: expected index {expected:03}, found {:03}",
                    entry.index
                )));
            }
        }
        Ok(entries)
    }

    /// Append one encrypted patch at the next free index.
    ///
    /// The nonce lands before the ciphertext; patch existence is keyed on
    /// the ciphertext name, so a crash between the two renames strands at
    /// worst a nonce file that the retried append overwrites. Returns the
    /// index the patch was written at.
    pub fn append_patch(&self, ciphertext: &[u8], nonce: &Nonce) -> GvResult<u32> {
        let index = self.next_patch_index()?;
        let dir = self.patches_dir();
        write_atomic(
            &dir.join(format!("{index:03}{NONCE_SUFFIX}")),
            nonce_to_hex(nonce).as_bytes(),
        )?;
        write_atomic(
            &dir.join(format!("{index:03}{PATCH_SUFFIX}")),
            ciphertext,
        )?;
        debug!(index, bytes = ciphertext.len(), "patch appended");
        Ok(index)
    }

    pub fn read_patch(&self, entry: &PatchEntry) -> GvResult<(Vec<u8>, Nonce)> {
        let ciphertext = fs::read(&entry.ciphertext_path)?;
        let nonce_raw = fs::read_to_string(&entry.nonce_path)?;
        Ok((ciphertext, nonce_from_hex(&nonce_raw)?))
    }

    /// Read the stored state hash (64 lowercase hex chars).
    pub fn read_state_hash(&self) -> GvResult<String> {
        let raw = fs::read_to_string(self.state_hash_path())?;
        let raw = raw.trim().to_string();
        if raw.len() != 64 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GvError::Store(format!(
                "state.hash is not a 64-char hex digest: {raw:?}"
            )));
        }
        Ok(raw)
    }

    /// Overwrite the state hash. Always the last write of a `lock`, so a
    /// crash beforehand leaves the hash pointing at the previous state.
    pub fn write_state_hash(&self, hash_hex: &str) -> GvResult<()> {
        write_atomic(&self.state_hash_path(), hash_hex.as_bytes())
    }
}

/// Write `data` to `path` via temp-name + fsync + rename in the same
/// directory, so the destination is never observed half-written.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> GvResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| GvError::Store(format!("no parent directory: {}", path.display())))?;
    let tmp = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));
    {
        let mut file = File::create(&tmp)?;
        use std::io::Write;
        file.write_all(data)?;
        file.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
