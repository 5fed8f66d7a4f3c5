//! Error types for network construction, training and configuration.

use std::io;

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

#[derive(Error, Debug)]
pub enum NetworkError {
    /// The requested topology cannot be built (too few layers, zero-width layer,
    /// weight count disagreeing with the layer wiring).
    #[error("Cannot construct network: {reason}")]
    Construction { reason: String },

    /// Caller-supplied data does not match the declared topology.
    #[error("Dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    /// A configuration file could not be parsed or holds invalid values.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl NetworkError {
    pub(crate) fn construction(reason: impl Into<String>) -> Self {
        NetworkError::Construction {
            reason: reason.into(),
        }
    }

    pub(crate) fn dimension(expected: usize, got: usize, context: impl Into<String>) -> Self {
        NetworkError::DimensionMismatch {
            expected,
            got,
            context: context.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        NetworkError::Config {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::config(err.to_string())
    }
}
