//! Error types for the copy engine and its configuration.

use thiserror::Error;

/// Failure of a deep copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopyError {
    /// Nesting depth exceeded the configured bound.
    ///
    /// With a memo that remembers nothing this is how a cyclic input ends.
    #[error("maximum recursion depth exceeded while deep-copying (limit: {limit})")]
    RecursionLimitExceeded { limit: usize },
}

/// Result type for copy operations.
pub type Result<T> = std::result::Result<T, CopyError>;

/// Invalid configuration input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Recursion limit override could not be parsed.
    #[error("invalid recursion limit '{value}': expected a positive integer")]
    InvalidRecursionLimit { value: String },
}
