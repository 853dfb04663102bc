//! Shared fixtures for the end-to-end vault scenarios.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use gv_crypto::MasterKey;
use gv_vault::Vault;

pub const VAULT: &str = "secrets";

pub fn test_key() -> MasterKey {
    MasterKey::from_hex(&"5a".repeat(32)).unwrap()
}

/// A repo root with a `secrets/` working directory seeded from `entries`.
pub fn repo_with_tree(entries: &[(&str, &[u8])]) -> tempfile::TempDir {
    let repo = tempfile::tempdir().unwrap();
    write_tree(&repo.path().join(VAULT), entries);
    repo
}

pub fn write_tree(root: &Path, entries: &[(&str, &[u8])]) {
    fs::create_dir_all(root).unwrap();
    for (rel, data) in entries {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }
}

pub fn open_vault(repo: &Path) -> Vault {
    Vault::open(repo, VAULT).unwrap()
}

pub fn work_dir(repo: &Path) -> PathBuf {
    repo.join(VAULT)
}

pub fn data_dir(repo: &Path) -> PathBuf {
    repo.join(".git-vault/data").join(VAULT)
}

pub fn cache_dir(repo: &Path) -> PathBuf {
    repo.join(".git-vault/cache").join(VAULT)
}

/// Read every file under `root` as `(relative_path, bytes)`, sorted.
pub fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    gv_crypto::digest::list_files(root)
        .unwrap()
        .into_iter()
        .map(|(rel, abs)| (rel, fs::read(abs).unwrap()))
        .collect()
}

/// True if `haystack` contains `needle` as a byte substring.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
