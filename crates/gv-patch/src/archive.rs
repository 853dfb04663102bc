//! Base snapshot archive: gzip-compressed tar of a directory's regular files.
//!
//! Entries carry content only (mode 0644, mtime 0) in the same sorted
//! relative-path order as the directory digest, so identical trees archive
//! identically. Unpacking refuses anything but plain relative file entries.

use std::fs;
use std::io::Read;
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder, EntryType, Header};

use gv_core::{GvError, GvResult};
use gv_crypto::digest::list_files;

/// Pack the regular files under `root` into a gzip'd tar in memory.
pub fn pack_dir(root: &Path) -> GvResult<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    for (rel, abs) in list_files(root)? {
        let data = fs::read(&abs)?;
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        builder
            .append_data(&mut header, &rel, data.as_slice())
            .map_err(|e| GvError::Store(format!("archiving {rel}: {e}")))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| GvError::Store(format!("finishing archive: {e}")))?;
    Ok(encoder
        .finish()
        .map_err(|e| GvError::Store(format!("finishing gzip stream: {e}")))?)
}

/// Unpack an archive produced by [`pack_dir`] into `target`.
///
/// Only regular-file entries with safe relative paths are materialized;
/// anything else is treated as a corrupt archive.
pub fn unpack_archive(bytes: &[u8], target: &Path) -> GvResult<()> {
    let mut archive = Archive::new(GzDecoder::new(bytes));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let header_type = entry.header().entry_type();
        if header_type == EntryType::Directory {
            continue;
        }
        if header_type != EntryType::Regular {
            return Err(GvError::CorruptPatch(format!(
                "unexpected archive entry type: {header_type:?}"
            )));
        }
        let rel = entry
            .path()
            .map_err(|e| GvError::CorruptPatch(format!("bad archive path: {e}")))?
            .into_owned();
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(GvError::CorruptPatch(format!(
                "archive path escapes target: {}",
                rel.display()
            )));
        }
        let dest = target.join(&rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        fs::write(&dest, &data)?;
    }
    Ok(())
}
