//! Study session module
//!
//! Runs flashcard review sessions against a card repository:
//! - Card selection (server-ranked smart mode or client-side legacy filtering)
//! - Session state machine with grading and progress tracking
//! - REST and JSON file repository backends

pub mod errors;
pub mod models;
pub mod progress;
pub mod remote;
pub mod repository;
pub mod selector;
pub mod session;
pub mod settings;
pub mod storage;

#[cfg(test)]
pub mod testing;

pub use errors::{RepositoryError, RepositoryResult, StudyError, StudyResult};
pub use models::{Card, CardSide, CardsResponse, Deck, FetchOptions, Grade, StudyMode, StudySessionInfo};
pub use progress::{StudyStats, SessionClock};
pub use remote::HttpCardRepository;
pub use repository::CardRepository;
pub use selector::{select_cards_for_session, Selection};
pub use session::{CardVisit, MarkOutcome, SessionController, SessionPhase, SessionView};
pub use settings::{load_settings, UserSettings};
pub use storage::LocalCardRepository;
