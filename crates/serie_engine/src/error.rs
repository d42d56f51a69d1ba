//! Error types for the serie engine

use thiserror::Error;

/// Errors that can occur while updating a series' visuals
#[derive(Error, Debug)]
pub enum EngineError {
    /// The label pool has no room for another live label
    #[error("Label pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    /// The host failed to create a visual object
    #[error("Visual creation failed: {0}")]
    VisualCreation(String),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
