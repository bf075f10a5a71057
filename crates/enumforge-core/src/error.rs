//! Error types for model construction.

use thiserror::Error;

/// Errors raised synchronously while building a [`Model`](crate::Model).
///
/// None of these are ever produced mid-enumeration: a model that was built
/// successfully only grows by cuts derived from its own variables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A constraint references a variable the model does not own.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    /// A variable with the same key is already registered.
    #[error("Duplicate variable: {0}")]
    DuplicateVariable(String),

    /// A variable handle does not belong to this model.
    #[error("Unknown variable: #{0}")]
    UnknownVariable(usize),

    /// A fixed variable was pinned again to a different value.
    #[error("Variable #{index} is already fixed to {fixed}")]
    ConflictingFix { index: usize, fixed: bool },
}

/// Result type alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
