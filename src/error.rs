//! Error types.

use thiserror::Error;

/// Errors surfaced by matrix loading, configuration validation and
/// report writing.
///
/// The optimization loop itself never fails once its configuration
/// has been validated.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// A parameter is out of range (zero problem size, empty population,
    /// ratio outside `[0, 1]`, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A relation matrix source could not be interpreted.
    #[error("malformed relation matrix at line {line}: {message}")]
    MalformedMatrix { line: usize, message: String },

    /// Reading a matrix or writing a report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClusterError {
    /// Creates an [`InvalidConfiguration`](ClusterError::InvalidConfiguration) error.
    pub fn config(message: impl Into<String>) -> Self {
        ClusterError::InvalidConfiguration(message.into())
    }

    /// Creates a [`MalformedMatrix`](ClusterError::MalformedMatrix) error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        ClusterError::MalformedMatrix {
            line,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClusterError>;
