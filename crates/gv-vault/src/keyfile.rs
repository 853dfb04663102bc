//! Master-key loading from the repository's untracked env file.
//!
//! `.git-vault.env` sits at the repository root, outside version control,
//! and doubles as a shell env file, so `export KEY=...` lines are accepted.

use std::path::Path;

use gv_core::{GvError, GvResult};
use gv_crypto::MasterKey;

pub const ENV_FILE: &str = ".git-vault.env";
pub const KEY_VAR: &str = "GIT_VAULT_KEY";

/// Read the master key from `<repo_root>/.git-vault.env`.
pub fn load_master_key(repo_root: &Path) -> GvResult<MasterKey> {
    let path = repo_root.join(ENV_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|e| {
        GvError::Config(format!("reading key file {}: {e}", path.display()))
    })?;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((name, value)) = line.split_once('=') {
            if name.trim() == KEY_VAR {
                return MasterKey::from_hex(value);
            }
        }
    }
    Err(GvError::Config(format!(
        "{KEY_VAR} not found in {}",
        path.display()
    )))
}
