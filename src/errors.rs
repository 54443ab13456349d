//! Core error type.
//!
//! Mirrors the kinds enumerated in SPEC_FULL.md §7. `Repository` is the
//! ambient wrapper around the persistence layer, following the teacher's
//! layered style of keeping a storage-specific error (`diesel::result::Error`)
//! separate from the domain error surfaced to callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("path occupied: {0}")]
    PathOccupied(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("transient error, safe to retry: {0}")]
    Transient(String),

    #[error("repository error: {0}")]
    Repository(#[from] diesel::result::Error),

    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// True if the caller may safely retry the operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Transient(_) => true,
            CoreError::Repository(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            )) => true,
            _ => false,
        }
    }
}
