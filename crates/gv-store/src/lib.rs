//! gv-store: the on-disk layout of a vault.
//!
//! ```text
//! <repo>/.git-vault/data/<vault>/
//!     base.tar.gz.aes256gcm.enc
//!     base.nonce
//!     state.hash
//!     patches/
//!         001.patch.aes256gcm.enc
//!         001.nonce
//!         ...
//! ```
//!
//! Everything under `data/` is meant to be committed; only encrypted
//! artifacts, nonces, and digests ever land here. All mutable files are
//! written temp-name + fsync + rename so no partial artifact survives a
//! crash.

mod lock;
mod store;

pub use lock::StoreLock;
pub use store::{PatchEntry, VaultStore, BASE_CIPHERTEXT, BASE_NONCE, STATE_HASH};
