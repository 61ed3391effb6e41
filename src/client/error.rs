//! Engine client error types

use thiserror::Error;

/// Error types for container engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to connect to container engine: {0}")]
    Connection(String),

    #[error("engine API error: {0}")]
    Api(String),

    #[error("wait ended without a result")]
    WaitAborted,
}

impl From<bollard::errors::Error> for EngineError {
    fn from(err: bollard::errors::Error) -> Self {
        EngineError::Api(err.to_string())
    }
}
