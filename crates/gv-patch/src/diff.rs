//! Change-set synthesis between a previous logical state and the current
//! directory, including the binary-delta run chunker for large files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use gv_core::GvResult;
use gv_crypto::digest::{list_files, sha256};

use crate::record::ChangeRecord;

/// Files at or below this size are always replaced whole with `MODIFY`.
pub const MODIFY_WHOLE_LIMIT: usize = 1024;

/// Two differing runs closer than this are coalesced into one.
pub const RUN_GAP_MERGE: usize = 64;

/// A single run never exceeds this many bytes.
pub const RUN_MAX_LEN: usize = 1024;

/// Compute the change set that transforms `prev_root` into `cur_root`.
///
/// Record order: deletions, then creations, then modifications, each group
/// in lexicographic path order. An identical tree yields an empty set.
pub fn synthesize(prev_root: &Path, cur_root: &Path) -> GvResult<Vec<ChangeRecord>> {
    let prev: BTreeMap<String, PathBuf> = list_files(prev_root)?.into_iter().collect();
    let cur: BTreeMap<String, PathBuf> = list_files(cur_root)?.into_iter().collect();

    let mut records = Vec::new();

    for path in prev.keys() {
        if !cur.contains_key(path) {
            records.push(ChangeRecord::Delete { path: path.clone() });
        }
    }

    for (path, abs) in &cur {
        if !prev.contains_key(path) {
            records.push(ChangeRecord::Create {
                path: path.clone(),
                data: std::fs::read(abs)?,
            });
        }
    }

    for (path, cur_abs) in &cur {
        let Some(prev_abs) = prev.get(path) else {
            continue;
        };
        let prev_data = std::fs::read(prev_abs)?;
        let cur_data = std::fs::read(cur_abs)?;
        if sha256(&prev_data) == sha256(&cur_data) {
            continue;
        }
        let mut file_records = records_for_changed_file(path, &prev_data, &cur_data);
        debug!(
            path = %path,
            prev_len = prev_data.len(),
            cur_len = cur_data.len(),
            records = file_records.len(),
            "changed file"
        );
        records.append(&mut file_records);
    }

    Ok(records)
}

/// Decide between whole-file `MODIFY` and a `BINDIFF` sequence for one
/// changed file.
///
/// The chunker is only eligible when the lengths match; growth or shrinkage
/// falls back to `MODIFY`. Even when eligible, the encoded `BINDIFF` lines
/// must be strictly smaller than the single `MODIFY` line they replace.
fn records_for_changed_file(path: &str, prev: &[u8], cur: &[u8]) -> Vec<ChangeRecord> {
    let modify = ChangeRecord::Modify {
        path: path.to_string(),
        data: cur.to_vec(),
    };

    if prev.len().max(cur.len()) <= MODIFY_WHOLE_LIMIT || prev.len() != cur.len() {
        return vec![modify];
    }

    let runs = diff_runs(prev, cur);
    let bindiffs: Vec<ChangeRecord> = runs
        .into_iter()
        .map(|(offset, len)| ChangeRecord::BinDiff {
            path: path.to_string(),
            offset: offset as u64,
            data: cur[offset..offset + len].to_vec(),
        })
        .collect();

    let bindiff_cost: usize = bindiffs.iter().map(|r| r.encoded_len()).sum();
    if bindiff_cost < modify.encoded_len() {
        bindiffs
    } else {
        vec![modify]
    }
}

/// Locate the differing byte ranges of two equal-length buffers.
///
/// Consecutive differing positions form runs; runs separated by a gap of at
/// most `RUN_GAP_MERGE` unchanged bytes are coalesced (close runs are
/// cheaper to carry as one payload than to re-frame), and no emitted run
/// exceeds `RUN_MAX_LEN` bytes. Returns `(offset, len)` pairs in offset
/// order.
pub fn diff_runs(prev: &[u8], cur: &[u8]) -> Vec<(usize, usize)> {
    let limit = prev.len().min(cur.len());
    let mut merged: Vec<(usize, usize)> = Vec::new();

    let mut i = 0;
    while i < limit {
        if prev[i] == cur[i] {
            i += 1;
            continue;
        }
        let start = i;
        while i < limit && prev[i] != cur[i] {
            i += 1;
        }
        match merged.last_mut() {
            Some((last_start, last_len)) if start - (*last_start + *last_len) <= RUN_GAP_MERGE => {
                *last_len = i - *last_start;
            }
            _ => merged.push((start, i - start)),
        }
    }

    let mut runs = Vec::with_capacity(merged.len());
    for (start, len) in merged {
        let mut offset = start;
        let mut remaining = len;
        while remaining > RUN_MAX_LEN {
            runs.push((offset, RUN_MAX_LEN));
            offset += RUN_MAX_LEN;
            remaining -= RUN_MAX_LEN;
        }
        runs.push((offset, remaining));
    }
    runs
}
