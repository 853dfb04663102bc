//! gv-vault: the per-vault controller.
//!
//! Orchestrates `lock` (snapshot or patch append) and `unlock` (cache
//! fast-path or full replay) per vault, maintains the plaintext cache under
//! `.git-vault/cache/`, and enforces that nothing under `.git-vault/data/`
//! is ever plaintext.

pub mod cache;
pub mod controller;
pub mod keyfile;

pub use cache::Cache;
pub use controller::{Vault, VaultStatus};
pub use keyfile::{load_master_key, ENV_FILE, KEY_VAR};
