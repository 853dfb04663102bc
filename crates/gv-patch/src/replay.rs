//! Sequential replay: base + patches 1..N into a fresh directory.

use std::fs;
use std::path::Path;

use tracing::debug;
use zeroize::Zeroize;

use gv_core::{GvError, GvResult};
use gv_crypto::digest::{digest_dir, digest_to_hex};
use gv_crypto::{aead, MasterKey};
use gv_store::VaultStore;

use crate::apply::apply_changeset;
use crate::archive::unpack_archive;
use crate::record::parse_changeset;

/// Rebuild the vault's current plaintext state into `target`.
///
/// `target` is emptied first. The base archive and every patch are
/// authenticated before a byte of their plaintext is used; afterwards the
/// digest of the result must equal the stored state hash, else
/// `ReplayMismatch`. Returns that verified digest in hex. Decrypted
/// intermediate buffers are zeroed before release.
pub fn replay(store: &VaultStore, key: &MasterKey, target: &Path) -> GvResult<String> {
    let expected = store.read_state_hash()?;

    if target.exists() {
        fs::remove_dir_all(target)?;
    }
    fs::create_dir_all(target)?;

    let (ciphertext, nonce) = store.read_base()?;
    let mut archive = aead::open(key, &nonce, &ciphertext)?;
    let unpacked = unpack_archive(&archive, target);
    archive.zeroize();
    unpacked?;
    debug!(target = %target.display(), "base unpacked");

    for entry in store.list_patches()? {
        let (ciphertext, nonce) = store.read_patch(&entry)?;
        let mut plaintext = aead::open(key, &nonce, &ciphertext)?;
        let parsed = String::from_utf8(std::mem::take(&mut plaintext)).map_err(|_| {
            GvError::CorruptPatch(format!("patch {:03} is not valid UTF-8", entry.index))
        });
        let mut text = parsed?;
        let applied = parse_changeset(&text).and_then(|records| apply_changeset(&records, target));
        text.zeroize();
        applied?;
        debug!(index = entry.index, "patch applied");
    }

    let actual = digest_to_hex(&digest_dir(target)?);
    if actual != expected {
        return Err(GvError::ReplayMismatch { expected, actual });
    }
    Ok(actual)
}
