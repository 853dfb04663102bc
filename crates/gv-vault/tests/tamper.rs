//! Tamper and corruption scenarios: cache repair, authentication failure,
//! and the guarantee that failed restores leak nothing into the target.

mod common;

use std::fs;
use std::path::Path;

use gv_core::{GvError, UnlockOutcome};

use common::*;

fn flip_byte(path: &Path, index: usize) {
    let mut bytes = fs::read(path).unwrap();
    bytes[index] ^= 0xff;
    fs::write(path, bytes).unwrap();
}

/// Locked twice: base `{a.txt: hello, sub/b.txt: world}`, patch 001 turning
/// `a.txt` into `HELLO`.
fn locked_repo() -> tempfile::TempDir {
    let repo = repo_with_tree(&[("a.txt", b"hello\n"), ("sub/b.txt", b"world\n")]);
    let vault = open_vault(repo.path());
    let key = test_key();
    vault.lock(&key).unwrap();
    fs::write(work_dir(repo.path()).join("a.txt"), b"HELLO\n").unwrap();
    vault.lock(&key).unwrap();
    repo
}

#[test]
fn cache_file_deletion_falls_back_to_replay_and_repairs() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());

    fs::remove_file(cache_dir(repo.path()).join("content/a.txt")).unwrap();

    assert_eq!(
        vault.unlock(&test_key()).unwrap(),
        UnlockOutcome::Replayed
    );
    assert_eq!(
        fs::read(work_dir(repo.path()).join("a.txt")).unwrap(),
        b"HELLO\n"
    );
    // Cache re-validates after the repair.
    assert_eq!(
        vault.unlock(&test_key()).unwrap(),
        UnlockOutcome::FromCache
    );
}

#[test]
fn corrupted_cache_hash_falls_back_to_replay() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());

    fs::write(cache_dir(repo.path()).join("state.hash"), "00".repeat(32)).unwrap();
    assert_eq!(
        vault.unlock(&test_key()).unwrap(),
        UnlockOutcome::Replayed
    );
    assert!(vault.status().unwrap().cache_valid);
}

#[test]
fn tampered_cache_content_is_never_trusted() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());

    // Stored hash still matches the vault; only the bytes lie.
    fs::write(
        cache_dir(repo.path()).join("content/a.txt"),
        b"planted-content\n",
    )
    .unwrap();

    vault.unlock(&test_key()).unwrap();
    assert_eq!(
        fs::read(work_dir(repo.path()).join("a.txt")).unwrap(),
        b"HELLO\n"
    );
}

#[test]
fn stray_cache_file_invalidates_cache() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());

    fs::write(cache_dir(repo.path()).join("content/stray.txt"), b"junk").unwrap();
    assert_eq!(
        vault.unlock(&test_key()).unwrap(),
        UnlockOutcome::Replayed
    );
    assert!(!work_dir(repo.path()).join("stray.txt").exists());
}

#[test]
fn flipped_patch_ciphertext_fails_auth_and_leaks_nothing() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());
    fs::remove_dir_all(cache_dir(repo.path())).unwrap();
    fs::remove_dir_all(work_dir(repo.path())).unwrap();

    flip_byte(
        &data_dir(repo.path()).join("patches/001.patch.aes256gcm.enc"),
        0,
    );

    assert!(matches!(
        vault.unlock(&test_key()),
        Err(GvError::Auth)
    ));
    // Failed replay must not materialize any plaintext in the target.
    assert!(!work_dir(repo.path()).exists());
}

#[test]
fn flipped_base_ciphertext_fails_auth() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());
    fs::remove_dir_all(cache_dir(repo.path())).unwrap();

    flip_byte(&data_dir(repo.path()).join("base.tar.gz.aes256gcm.enc"), 10);
    assert!(matches!(vault.unlock(&test_key()), Err(GvError::Auth)));
}

#[test]
fn corrupted_nonce_fails_auth() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());
    fs::remove_dir_all(cache_dir(repo.path())).unwrap();

    let nonce_path = data_dir(repo.path()).join("base.nonce");
    let nonce = fs::read_to_string(&nonce_path).unwrap();
    let flipped = if nonce.as_bytes()[0] == b'0' { "1" } else { "0" };
    fs::write(&nonce_path, format!("{flipped}{}", &nonce[1..])).unwrap();

    assert!(matches!(vault.unlock(&test_key()), Err(GvError::Auth)));
}

#[test]
fn wrong_key_fails_auth() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());
    fs::remove_dir_all(cache_dir(repo.path())).unwrap();

    let wrong = gv_crypto::MasterKey::from_hex(&"99".repeat(32)).unwrap();
    assert!(matches!(vault.unlock(&wrong), Err(GvError::Auth)));
}

#[test]
fn deleted_patch_in_middle_is_detected() {
    let repo = locked_repo();
    let vault = open_vault(repo.path());
    let key = test_key();

    // Grow the log to two patches, then punch a hole at 001.
    fs::write(work_dir(repo.path()).join("a.txt"), b"third\n").unwrap();
    vault.lock(&key).unwrap();
    fs::remove_file(data_dir(repo.path()).join("patches/001.patch.aes256gcm.enc")).unwrap();
    fs::remove_file(data_dir(repo.path()).join("patches/001.nonce")).unwrap();
    fs::remove_dir_all(cache_dir(repo.path())).unwrap();

    assert!(matches!(vault.unlock(&key), Err(GvError::Store(_))));
}
