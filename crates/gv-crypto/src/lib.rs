//! gv-crypto: authenticated encryption and content digests for git-vault
//!
//! Every encrypted artifact in a vault is a single AES-256-GCM stream:
//! ciphertext followed by the 16-byte tag, with its 96-bit nonce stored in a
//! sibling `.nonce` file. One master key covers all vaults of a repository;
//! nonces are sampled fresh from the OS RNG for every encryption.

pub mod aead;
pub mod digest;
pub mod key;

pub use aead::{fresh_nonce, nonce_from_hex, nonce_to_hex, open, seal, Nonce};
pub use digest::{digest_dir, digest_to_hex, list_files, sha256};
pub use key::MasterKey;

/// Master key size in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// GCM nonce size in bytes (96-bit)
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size in bytes
pub const TAG_SIZE: usize = 16;
