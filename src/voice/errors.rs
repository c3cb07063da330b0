//! Speech error types

use thiserror::Error;

/// Errors from the speech output service. None of these affect session state.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Failed to start speech engine: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Speech engine error: {0}")]
    Engine(String),

    #[error("Voice not available: {0}")]
    VoiceNotFound(String),

    #[error("Speech output unavailable")]
    Unavailable,
}

pub type SpeechResult<T> = std::result::Result<T, SpeechError>;
