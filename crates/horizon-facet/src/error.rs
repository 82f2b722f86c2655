//! Error types for selection tracking.

use crate::handler::SelectMode;

/// Result type alias for selection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in selection handling.
///
/// A vetoed change is not an error: mutating handler calls return
/// `Ok(false)` when an observer rejects the transition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filter evaluation or attribute resolution failed.
    #[error(transparent)]
    Query(#[from] horizon_facet_core::Error),

    /// A caller contract violation, e.g. select-all outside multi mode.
    #[error("{operation} is not supported in {mode:?} mode")]
    UnsupportedOperation {
        mode: SelectMode,
        operation: &'static str,
    },

    /// The paged query service failed.
    #[error("query service error: {0}")]
    Service(String),
}

impl Error {
    /// Create an unsupported operation error.
    pub fn unsupported(mode: SelectMode, operation: &'static str) -> Self {
        Self::UnsupportedOperation { mode, operation }
    }

    /// Create a query service error.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }
}
