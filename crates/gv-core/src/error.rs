use thiserror::Error;

pub type GvResult<T> = Result<T, GvError>;

#[derive(Debug, Error)]
pub enum GvError {
    /// Master key is not 64 hex characters.
    #[error("invalid master key: expected 64 lowercase hex characters")]
    InvalidKey,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GCM tag verification failed on a base archive or patch.
    #[error("authentication failure: ciphertext or nonce is corrupt or tampered")]
    Auth,

    #[error("corrupt patch: {0}")]
    CorruptPatch(String),

    /// Post-replay digest did not match the stored state hash.
    #[error("replay mismatch: reconstructed digest {actual} != stored state hash {expected}")]
    ReplayMismatch { expected: String, actual: String },

    #[error("vault has no base snapshot: {0}")]
    VaultMissing(String),

    #[error("vault store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
