use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GvError, GvResult};
use crate::types::validate_vault_path;

/// Name of the directory holding all vault artifacts, relative to the repo root.
pub const VAULT_DIR: &str = ".git-vault";

/// Repository-level configuration (loaded from .git-vault/config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitVaultConfig {
    /// Logical vault paths relative to the repository root.
    pub vaults: Vec<String>,
}

impl GitVaultConfig {
    /// Load the config from `<repo_root>/.git-vault/config.toml`.
    ///
    /// A missing file yields an empty vault list; a present but malformed
    /// file or an invalid vault path is a `Config` error.
    pub fn load(repo_root: &Path) -> GvResult<Self> {
        let path = Self::path(repo_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config: GitVaultConfig = toml::from_str(&raw)
            .map_err(|e| GvError::Config(format!("parsing {}: {e}", path.display())))?;
        for vault in &config.vaults {
            validate_vault_path(vault)?;
        }
        Ok(config)
    }

    pub fn path(repo_root: &Path) -> PathBuf {
        repo_root.join(VAULT_DIR).join("config.toml")
    }
}
