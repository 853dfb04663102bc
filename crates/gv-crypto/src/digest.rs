//! Content-only directory digest.
//!
//! The fingerprint of a tree is `sha256(concat(sha256(file_bytes)))` over the
//! regular files under the root, ordered by byte-wise lexicographic
//! comparison of their `/`-separated relative paths. Metadata, symlinks, and
//! empty directories do not participate, so the digest is stable across
//! operating systems and checkout quirks. A zero-file tree digests to
//! `sha256("")`.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use gv_core::GvResult;

/// SHA-256 of a byte slice.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Render a digest as 64 lowercase hex chars.
pub fn digest_to_hex(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}

/// Enumerate the regular files under `root` as `(relative, absolute)` pairs,
/// sorted byte-wise by the `/`-separated relative path.
///
/// Symlinks are neither followed nor listed. A missing `root` is an I/O
/// error; an empty directory yields an empty list.
pub fn list_files(root: &Path) -> GvResult<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    walk(root, root, &mut files)?;
    files.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    Ok(files)
}

fn walk(base: &Path, current: &Path, out: &mut Vec<(String, PathBuf)>) -> GvResult<()> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            walk(base, &path, out)?;
        } else if file_type.is_file() {
            let relative = path
                .strip_prefix(base)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push((relative, path));
        }
    }
    Ok(())
}

/// Compute the directory digest of `root`.
pub fn digest_dir(root: &Path) -> GvResult<[u8; 32]> {
    let mut buffer = Vec::new();
    for (_, path) in list_files(root)? {
        let data = std::fs::read(&path)?;
        buffer.extend_from_slice(&sha256(&data));
    }
    Ok(sha256(&buffer))
}
