//! Error types for the query crate.

use thiserror::Error;

/// Errors reported by the element selectors.
///
/// These are ordinary outcomes of querying a sequence, not faults: callers
/// are expected to match on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A selector required at least one match and found none.
    #[error("sequence contains no matching element")]
    NoMatch,

    /// A selector required at most one match and found more than one.
    #[error("sequence contains more than one matching element")]
    MultipleMatch,

    /// Positional access past the end of the sequence.
    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl QueryError {
    /// Returns `true` for [`QueryError::NoMatch`].
    pub fn is_no_match(&self) -> bool {
        matches!(self, QueryError::NoMatch)
    }

    /// Returns `true` for [`QueryError::MultipleMatch`].
    pub fn is_multiple_match(&self) -> bool {
        matches!(self, QueryError::MultipleMatch)
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
