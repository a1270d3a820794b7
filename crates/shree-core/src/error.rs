/// Unified error type for the shree-core crate. Dispatch failures are
/// modeled as reported outcomes, not errors; this type is for the
/// collaborator seams (URL opening, reporting).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
