//! Error definitions for the routing core.

use thiserror::Error;

/// Errors surfaced by route registration and match computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MuxError {
    /// A parameter segment has an empty name (`/a/:` or `/a/:/b`).
    #[error("invalid pattern {pattern:?}: parameter name must not be empty")]
    InvalidPattern { pattern: String },

    /// The same parameter name appears twice in one pattern.
    #[error("invalid pattern {pattern:?}: parameter {name:?} is declared more than once")]
    DuplicateParam { pattern: String, name: String },

    /// A group with the same normalized prefix is already registered.
    #[error("group {0:?} already exists")]
    GroupAlreadyExists(String),

    /// Unexpected fault while computing a match.
    #[error("internal match fault: {0}")]
    InternalMatchFault(String),
}

/// Result type for routing operations.
pub type MuxResult<T> = Result<T, MuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MuxError::InvalidPattern {
            pattern: "/a/:".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid pattern \"/a/:\": parameter name must not be empty"
        );

        let err = MuxError::GroupAlreadyExists("/api".into());
        assert_eq!(err.to_string(), "group \"/api\" already exists");
    }
}
