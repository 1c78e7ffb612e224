use thiserror::Error;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("submission signed by unauthorized identity {identity}")]
    Unauthorized { identity: String },

    #[error("submission signature is invalid")]
    InvalidSignature,

    #[error("integrity violation at seq {seq}: {reason}")]
    IntegrityViolation { seq: u64, reason: String },

    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("recorder queue is closed")]
    RecorderClosed,

    #[error("serialization error: {0}")]
    Serialization(String),
}
