//! Engine error types

use quell_dom::DomError;

/// Engine error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Invalid message: {0}")]
    Message(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
