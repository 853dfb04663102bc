//! Apply a decoded change set to a working tree.

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use gv_core::{GvError, GvResult};

use crate::record::{check_record_path, ChangeRecord};

/// Apply `records` to `target` in file order.
///
/// `DELETE` of a missing file is a no-op; `CREATE`/`MODIFY` create parent
/// directories and truncate; `BINDIFF` requires the file to exist and the
/// range to lie inside it. Paths are re-checked so a record can never write
/// outside `target`.
pub fn apply_changeset(records: &[ChangeRecord], target: &Path) -> GvResult<()> {
    for record in records {
        check_record_path(record.path())?;
        let dest = target.join(record.path());
        match record {
            ChangeRecord::Delete { path } => {
                match fs::remove_file(&dest) {
                    Ok(()) => debug!(path = %path, "deleted"),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
            ChangeRecord::Create { path, data } | ChangeRecord::Modify { path, data } => {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&dest, data)?;
                debug!(path = %path, bytes = data.len(), "written");
            }
            ChangeRecord::BinDiff { path, offset, data } => {
                let mut file = OpenOptions::new().write(true).open(&dest).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        GvError::CorruptPatch(format!("BINDIFF target missing: {path}"))
                    } else {
                        e.into()
                    }
                })?;
                let file_len = file.metadata()?.len();
                let end = offset
                    .checked_add(data.len() as u64)
                    .ok_or_else(|| GvError::CorruptPatch(format!("BINDIFF offset overflow: {path}")))?;
                if end > file_len {
                    return Err(GvError::CorruptPatch(format!(
                        "BINDIFF range {offset}..{end} exceeds file length {file_len}: {path}"
                    )));
                }
                file.seek(SeekFrom::Start(*offset))?;
                file.write_all(data)?;
                debug!(path = %path, offset, bytes = data.len(), "range overwritten");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_makes_parents_and_modify_truncates() {
        let dir = tempfile::tempdir().unwrap();
        apply_changeset(
            &[ChangeRecord::Create {
                path: "deep/nested/new.txt".into(),
                data: b"hello".to_vec(),
            }],
            dir.path(),
        )
        .unwrap();
        assert_eq!(
            fs::read(dir.path().join("deep/nested/new.txt")).unwrap(),
            b"hello"
        );

        apply_changeset(
            &[ChangeRecord::Modify {
                path: "deep/nested/new.txt".into(),
                data: b"hi".to_vec(),
            }],
            dir.path(),
        )
        .unwrap();
        assert_eq!(
            fs::read(dir.path().join("deep/nested/new.txt")).unwrap(),
            b"hi"
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), b"x").unwrap();
        let records = vec![ChangeRecord::Delete {
            path: "f.txt".into(),
        }];
        apply_changeset(&records, dir.path()).unwrap();
        assert!(!dir.path().join("f.txt").exists());
        apply_changeset(&records, dir.path()).unwrap();
    }

    #[test]
    fn bindiff_overwrites_in_place_without_resizing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.bin"), vec![0u8; 64]).unwrap();

        apply_changeset(
            &[ChangeRecord::BinDiff {
                path: "f.bin".into(),
                offset: 10,
                data: vec![1, 2, 3],
            }],
            dir.path(),
        )
        .unwrap();

        let bytes = fs::read(dir.path().join("f.bin")).unwrap();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[10..13], &[1, 2, 3]);
        assert_eq!(bytes[9], 0);
        assert_eq!(bytes[13], 0);
    }

    #[test]
    fn sequential_bindiffs_apply_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.bin"), vec![0u8; 16]).unwrap();
        apply_changeset(
            &[
                ChangeRecord::BinDiff {
                    path: "f.bin".into(),
                    offset: 0,
                    data: vec![1, 1],
                },
                ChangeRecord::BinDiff {
                    path: "f.bin".into(),
                    offset: 1,
                    data: vec![2],
                },
            ],
            dir.path(),
        )
        .unwrap();
        let bytes = fs::read(dir.path().join("f.bin")).unwrap();
        assert_eq!(&bytes[..3], &[1, 2, 0]);
    }

    #[test]
    fn bindiff_on_missing_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let result = apply_changeset(
            &[ChangeRecord::BinDiff {
                path: "absent.bin".into(),
                offset: 0,
                data: vec![1],
            }],
            dir.path(),
        );
        assert!(matches!(result, Err(GvError::CorruptPatch(_))));
    }

    #[test]
    fn bindiff_past_end_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.bin"), vec![0u8; 8]).unwrap();
        let result = apply_changeset(
            &[ChangeRecord::BinDiff {
                path: "f.bin".into(),
                offset: 6,
                data: vec![1, 2, 3],
            }],
            dir.path(),
        );
        assert!(matches!(result, Err(GvError::CorruptPatch(_))));
        // File untouched up to the failed record's range check.
        assert_eq!(fs::read(dir.path().join("f.bin")).unwrap(), vec![0u8; 8]);
    }
}
