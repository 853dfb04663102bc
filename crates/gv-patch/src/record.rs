//! Change-record codec.
//!
//! Wire form, one record per line:
//!
//! ```text
//! CREATE:sub/new.txt:aGVsbG8=
//! MODIFY:a.txt:SEVMTE8K
//! DELETE:gone.txt
//! BINDIFF:big.bin:4096:3q2+7w==
//! ```
//!
//! Lines starting with `#` are comments. A parser splits each record on the
//! first two `:` only; everything after the second colon is payload verbatim
//! (`BINDIFF` payloads carry a further `OFFSET:B64` split). Paths are
//! `/`-separated, relative, and may not contain `:` or newline.

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};

use gv_core::{GvError, GvResult};

/// Standard base64, padded on emit, padding-indifferent on parse.
const B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One decoded change record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRecord {
    /// File did not exist previously; now exists with these bytes.
    Create { path: String, data: Vec<u8> },
    /// Whole-file replacement for a small changed file.
    Modify { path: String, data: Vec<u8> },
    /// File existed previously; remove it.
    Delete { path: String },
    /// Overwrite `data.len()` bytes at `offset` without changing file length.
    BinDiff {
        path: String,
        offset: u64,
        data: Vec<u8>,
    },
}

impl ChangeRecord {
    pub fn path(&self) -> &str {
        match self {
            ChangeRecord::Create { path, .. }
            | ChangeRecord::Modify { path, .. }
            | ChangeRecord::Delete { path }
            | ChangeRecord::BinDiff { path, .. } => path,
        }
    }

    /// Exact length in bytes of this record's encoded line, newline included.
    pub fn encoded_len(&self) -> usize {
        self.encode().len() + 1
    }

    fn encode(&self) -> String {
        match self {
            ChangeRecord::Create { path, data } => {
                format!("CREATE:{path}:{}", B64.encode(data))
            }
            ChangeRecord::Modify { path, data } => {
                format!("MODIFY:{path}:{}", B64.encode(data))
            }
            ChangeRecord::Delete { path } => format!("DELETE:{path}"),
            ChangeRecord::BinDiff { path, offset, data } => {
                format!("BINDIFF:{path}:{offset}:{}", B64.encode(data))
            }
        }
    }
}

/// A path is encodable iff it survives the wire format and cannot escape the
/// target directory on application.
pub fn check_record_path(path: &str) -> GvResult<()> {
    if path.is_empty() {
        return Err(GvError::CorruptPatch("empty path".into()));
    }
    if path.contains(':') || path.contains('\n') || path.contains('\r') {
        return Err(GvError::CorruptPatch(format!(
            "path contains a forbidden character: {path:?}"
        )));
    }
    if path.starts_with('/') {
        return Err(GvError::CorruptPatch(format!("absolute path: {path}")));
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(GvError::CorruptPatch(format!(
                "path segment not allowed: {path}"
            )));
        }
    }
    Ok(())
}

/// Encode a change set as its ASCII text form.
///
/// Paths are re-checked here so a synthesis bug cannot emit an unparseable
/// or escaping record.
pub fn encode_changeset(records: &[ChangeRecord]) -> GvResult<String> {
    let mut out = String::new();
    out.push_str("# git-vault change set v1\n");
    for record in records {
        check_record_path(record.path())?;
        out.push_str(&record.encode());
        out.push('\n');
    }
    Ok(out)
}

/// Parse the ASCII text form back into records.
///
/// Any malformed line is a `CorruptPatch`: unknown action, bad offset,
/// non-base64 payload, or an illegal path.
pub fn parse_changeset(text: &str) -> GvResult<Vec<ChangeRecord>> {
    let mut records = Vec::new();
    for line in text.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(3, ':');
        let action = parts.next().unwrap_or_default();
        let path = parts
            .next()
            .ok_or_else(|| GvError::CorruptPatch(format!("record has no path: {line:?}")))?
            .to_string();
        check_record_path(&path)?;
        let payload = parts.next().unwrap_or("");

        let record = match action {
            "CREATE" => ChangeRecord::Create {
                path,
                data: decode_b64(payload)?,
            },
            "MODIFY" => ChangeRecord::Modify {
                path,
                data: decode_b64(payload)?,
            },
            "DELETE" => {
                if !payload.is_empty() {
                    return Err(GvError::CorruptPatch(format!(
                        "DELETE carries a payload: {line:?}"
                    )));
                }
                ChangeRecord::Delete { path }
            }
            "BINDIFF" => {
                let (offset, b64) = payload.split_once(':').ok_or_else(|| {
                    GvError::CorruptPatch(format!("BINDIFF payload has no offset: {line:?}"))
                })?;
                let offset: u64 = offset.parse().map_err(|_| {
                    GvError::CorruptPatch(format!("malformed BINDIFF offset: {offset:?}"))
                })?;
                ChangeRecord::BinDiff {
                    path,
                    offset,
                    data: decode_b64(b64)?,
                }
            }
            other => {
                return Err(GvError::CorruptPatch(format!("unknown action: {other:?}")));
            }
        };
        records.push(record);
    }
    Ok(records)
}

fn decode_b64(payload: &str) -> GvResult<Vec<u8>> {
    B64.decode(payload)
        .map_err(|e| GvError::CorruptPatch(format!("invalid base64 payload: {e}")))
}
