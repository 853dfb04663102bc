//! git-vault: keep designated directories encrypted in version control.
//!
//! Commands:
//!   lock [VAULT]    - snapshot or append a patch for one vault (default: all configured)
//!   unlock [VAULT]  - restore plaintext from cache or full replay
//!   status          - per-vault report: base, patch count, cache validity

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use gv_core::GitVaultConfig;
use gv_vault::{load_master_key, Vault};

#[derive(Parser, Debug)]
#[command(
    name = "git-vault",
    version,
    about = "Incremental encrypted storage for repository directories"
)]
struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(long, short = 'C', env = "GIT_VAULT_ROOT", default_value = ".")]
    repo_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt the current state of one vault (or every configured vault)
    Lock {
        /// Logical vault path; defaults to the configured list
        vault: Option<String>,
    },
    /// Restore plaintext for one vault (or every configured vault)
    Unlock {
        /// Logical vault path; defaults to the configured list
        vault: Option<String>,
    },
    /// Show per-vault state without touching anything
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let repo_root = cli
        .repo_root
        .canonicalize()
        .with_context(|| format!("resolving repo root: {}", cli.repo_root.display()))?;

    match cli.command {
        Commands::Lock { vault } => {
            let key = load_master_key(&repo_root)?;
            for vault_path in resolve_vaults(&repo_root, vault)? {
                let vault = Vault::open(&repo_root, &vault_path)?;
                let outcome = vault
                    .lock(&key)
                    .with_context(|| format!("locking vault {vault_path}"))?;
                info!(vault = %vault_path, ?outcome, "lock finished");
            }
        }
        Commands::Unlock { vault } => {
            let key = load_master_key(&repo_root)?;
            for vault_path in resolve_vaults(&repo_root, vault)? {
                let vault = Vault::open(&repo_root, &vault_path)?;
                let outcome = vault
                    .unlock(&key)
                    .with_context(|| format!("unlocking vault {vault_path}"))?;
                info!(vault = %vault_path, ?outcome, "unlock finished");
            }
        }
        Commands::Status => {
            for vault_path in resolve_vaults(&repo_root, None)? {
                let vault = Vault::open(&repo_root, &vault_path)?;
                let status = vault.status()?;
                let hash = status
                    .state_hash
                    .as_deref()
                    .map(|h| &h[..12])
                    .unwrap_or("-");
                println!(
                    "{:<24} base={} patches={} state={} cache={}",
                    status.vault_path,
                    if status.has_base { "yes" } else { "no" },
                    status.patch_count,
                    hash,
                    if status.cache_valid { "valid" } else { "invalid" },
                );
            }
        }
    }
    Ok(())
}

/// A vault named on the command line wins; otherwise the configured list.
fn resolve_vaults(repo_root: &std::path::Path, explicit: Option<String>) -> Result<Vec<String>> {
    if let Some(vault) = explicit {
        return Ok(vec![vault]);
    }
    let config = GitVaultConfig::load(repo_root)?;
    if config.vaults.is_empty() {
        bail!(
            "no vaults configured in {} and none given on the command line",
            GitVaultConfig::path(repo_root).display()
        );
    }
    Ok(config.vaults)
}
