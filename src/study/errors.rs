//! Study session error types

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a card repository backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}

/// Errors surfaced by the session controller
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("Failed to fetch cards: {0}")]
    Fetch(#[source] RepositoryError),

    #[error("Failed to save progress for card {card_id}: {source}")]
    Persistence {
        card_id: Uuid,
        #[source]
        source: RepositoryError,
    },

    #[error("Cannot {command} while session is {phase}")]
    InvalidState {
        command: &'static str,
        phase: &'static str,
    },

    #[error("No deck has been studied yet")]
    NoDeck,
}

impl From<StudyError> for String {
    fn from(err: StudyError) -> Self {
        err.to_string()
    }
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Result type alias for session operations
pub type StudyResult<T> = std::result::Result<T, StudyError>;
