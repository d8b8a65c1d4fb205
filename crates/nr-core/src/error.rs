/// Alias for `Result<T, NrError>`.
pub type NrResult<T> = Result<T, NrError>;

/// Errors that can occur when loading conditions or game state.
#[derive(Debug, thiserror::Error)]
pub enum NrError {
    /// The input could not be deserialized.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// Two conditions in the same set share an id.
    #[error("duplicate condition id: \"{0}\"")]
    DuplicateId(String),

    /// A condition record is structurally valid but unusable.
    #[error("invalid condition \"{id}\": {reason}")]
    InvalidCondition {
        /// The offending condition id (may be empty).
        id: String,
        /// What is wrong with it.
        reason: String,
    },
}
