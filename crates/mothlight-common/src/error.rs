//! Error types for Mothlight.

use crate::ids::MothId;
use thiserror::Error;

/// Top-level error type for flock operations.
#[derive(Debug, Error)]
pub enum FlockError {
    /// The level has no player locus, so the flock cannot run
    #[error("Player reference missing: flock controller cannot run")]
    MissingPlayer,

    /// A moth id outside the registry was addressed
    #[error("Unknown moth: {0}")]
    UnknownMoth(MothId),

    /// Configuration could not be used
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for flock operations.
pub type FlockResult<T> = Result<T, FlockError>;
