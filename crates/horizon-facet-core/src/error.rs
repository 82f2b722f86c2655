//! Error types for the filter and query engine.

/// Result type alias for filter and query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing paths or evaluating expressions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mandatory path segment could not be resolved, or resolved to null
    /// while further segments remained.
    #[error("cannot resolve '{segment}' in path '{path}': {message}")]
    AttributeResolution {
        path: String,
        segment: String,
        message: String,
    },

    /// The attribute path text could not be parsed.
    #[error("invalid attribute path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A structurally invalid expression, e.g. an AND or OR without children.
    #[error("malformed filter expression: {0}")]
    MalformedExpression(String),

    /// No evaluator is registered for the given expression or operator kind.
    #[error("no evaluator registered for {kind}")]
    UnknownEvaluator { kind: String },

    /// Two values were compared for ordering but do not share an order.
    #[error("cannot order {left} against {right}")]
    NotComparable { left: String, right: String },
}

impl Error {
    /// Create an attribute resolution error.
    pub fn resolution(
        path: impl Into<String>,
        segment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AttributeResolution {
            path: path.into(),
            segment: segment.into(),
            message: message.into(),
        }
    }

    /// Create a path parse error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a malformed expression error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedExpression(message.into())
    }

    /// Create an unknown evaluator error.
    pub fn unknown_evaluator(kind: impl Into<String>) -> Self {
        Self::UnknownEvaluator { kind: kind.into() }
    }
}
