/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or parsing model values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An attribute abbreviation could not be parsed.
    #[error("unknown attribute: \"{0}\"")]
    UnknownAttribute(String),

    /// A GUID string is not a valid UUID.
    #[error("invalid guid: \"{0}\"")]
    InvalidGuid(String),
}
