pub mod config;
pub mod error;
pub mod types;

pub use config::{GitVaultConfig, VAULT_DIR};
pub use error::{GvError, GvResult};
pub use types::{validate_vault_path, LockOutcome, UnlockOutcome};
