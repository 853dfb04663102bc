//! AES-256-GCM seal/open over whole byte buffers.
//!
//! Artifact framing: `[ciphertext][16-byte GCM tag]` in one contiguous
//! stream. The 96-bit nonce is not embedded; it lives in a sibling file and
//! is generated here from the OS RNG, one fresh nonce per encryption.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key};
use rand::rngs::OsRng;
use rand::RngCore;

use gv_core::{GvError, GvResult};

use crate::{MasterKey, NONCE_SIZE, TAG_SIZE};

/// A 96-bit GCM nonce.
pub type Nonce = [u8; NONCE_SIZE];

/// Sample a fresh nonce from the OS RNG.
pub fn fresh_nonce() -> Nonce {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` under `key` and `nonce`.
///
/// Returns ciphertext followed by the 16-byte authentication tag.
pub fn seal(key: &MasterKey, nonce: &Nonce, plaintext: &[u8]) -> GvResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .encrypt(aes_gcm::Nonce::from_slice(nonce), plaintext)
        .map_err(|_| GvError::Auth)
}

/// Decrypt and authenticate `ciphertext` (ciphertext ‖ tag).
///
/// Fails with `Auth` on any tag mismatch; nothing is returned on failure.
pub fn open(key: &MasterKey, nonce: &Nonce, ciphertext: &[u8]) -> GvResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(GvError::Auth);
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| GvError::Auth)
}

/// Render a nonce as its on-disk form: 24 lowercase hex chars, no newline.
pub fn nonce_to_hex(nonce: &Nonce) -> String {
    hex::encode(nonce)
}

/// Parse an on-disk nonce file's contents.
pub fn nonce_from_hex(raw: &str) -> GvResult<Nonce> {
    let raw = raw.trim();
    let mut nonce = [0u8; NONCE_SIZE];
    if raw.len() != NONCE_SIZE * 2 {
        return Err(GvError::Store(format!(
            "nonce file must hold {} hex chars, got {}",
            NONCE_SIZE * 2,
            raw.len()
        )));
    }
    hex::decode_to_slice(raw, &mut nonce)
        .map_err(|e| GvError::Store(format!("invalid nonce hex: {e}")))?;
    Ok(nonce)
}
