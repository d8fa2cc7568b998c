//! Error types for the store, the reconciler and the sync layer.

use dsa_core::CoreError;

/// Errors surfaced by every public operation of this crate.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The snapshot document could not be decoded.
    #[error("cannot decode snapshot: {0}")]
    Decode(String),

    /// The snapshot was written by a newer schema than this build reads.
    #[error("snapshot version {found} is newer than the supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
        /// Highest version this build understands.
        supported: u32,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of entity.
        entity: &'static str,
        /// Key that was looked up.
        key: String,
    },

    /// The store rejected a write with a constraint violation.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// The request violates a domain rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other store failure.
    #[error("store error: {0}")]
    Store(sqlx::Error),

    /// The peer transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Filesystem error while reading or writing snapshot files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if db.is_foreign_key_violation() || db.is_unique_violation() =>
            {
                Self::Integrity(db.message().to_string())
            }
            _ => Self::Store(err),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Alias for `Result<T, SyncError>`.
pub type SyncResult<T> = Result<T, SyncError>;
