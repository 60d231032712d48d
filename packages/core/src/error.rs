//! Error types for path parsing and path algebra.

/// Errors raised by [`RemotePath`](crate::RemotePath) and
/// [`GlobPattern`](crate::GlobPattern).
///
/// None of these involve I/O. Storage failures belong to the provider crates.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The string lacks a scheme, a bucket, or is otherwise not a remote path.
    #[error("malformed remote path {input:?}: {message}")]
    Malformed { input: String, message: String },

    /// `join` was handed an operand that is neither a string nor a path.
    #[error("unsupported join operand: {kind}")]
    UnsupportedOperand { kind: String },

    /// A structural query (`name`, `stem`, `suffix`) on a path with no segments.
    #[error("path {path} has no segments")]
    EmptyPath { path: String },

    /// The feature exists in the API but is intentionally not implemented.
    #[error("{feature} is not implemented")]
    NotImplemented { feature: &'static str },

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl PathError {
    pub(crate) fn malformed(input: &str, message: impl Into<String>) -> Self {
        PathError::Malformed {
            input: input.to_string(),
            message: message.into(),
        }
    }
}
