//! Flashcard study sessions with adaptive narration
//!
//! - [`study`]: card selection, the session state machine and card repositories
//! - [`voice`]: voice ranking, language detection and speech backends
//! - [`config`]: client configuration file

pub mod config;
pub mod study;
pub mod voice;
