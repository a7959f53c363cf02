use thiserror::Error;

/// Failure taxonomy of the memory store. Lifecycle failures
/// ([`StoreError::Unavailable`]) are fatal and should abort startup of the
/// owning process; the remaining variants are per-operation and handled by
/// the immediate caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("corrupt data: {0}")]
    CorruptData(#[from] serde_json::Error),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("database error: {0}")]
    Database(String),
}
