use dus_core::error::CoreError;

/// Failure of a transactional repository operation.
///
/// Business outcomes (missing segment, duplicate slug, ...) are reported as
/// [`StoreError::Core`]; the enclosing transaction has already been rolled
/// back by the time the caller sees either variant.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for repository results.
pub type StoreResult<T> = Result<T, StoreError>;
