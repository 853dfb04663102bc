use crate::error::{GvError, GvResult};

/// What a `lock` call did to the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// First lock: base snapshot written.
    BaseCreated,
    /// A patch was appended at this 1-based index.
    PatchAppended(u32),
    /// Directory digest matched the stored state hash; vault untouched.
    NoChange,
}

/// How an `unlock` call produced the target contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Cache validated on both checks and was copied into the target.
    FromCache,
    /// Full base + patch replay; cache rewritten afterwards.
    Replayed,
}

/// Validate a logical vault path: `/`-separated, relative, no traversal,
/// and representable inside a change record (no `:`, no newline).
pub fn validate_vault_path(path: &str) -> GvResult<()> {
    if path.is_empty() {
        return Err(GvError::Config("vault path is empty".into()));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(GvError::Config(format!(
            "vault path must be relative with no trailing slash: {path}"
        )));
    }
    if path.contains(':') || path.contains('\n') || path.contains('\\') {
        return Err(GvError::Config(format!(
            "vault path contains a forbidden character: {path}"
        )));
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(GvError::Config(format!("vault path segment not allowed: {path}")));
        }
    }
    Ok(())
}
