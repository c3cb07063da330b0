//! Voice narration module
//!
//! Picks a voice for card text and drives a speech backend:
//! - Voice catalog with quality ranking and gender detection
//! - Heuristic language detection for untagged text
//! - Command line and silent speech backends

pub mod catalog;
pub mod errors;
pub mod language;
pub mod models;
pub mod narrator;
pub mod speech;

#[cfg(test)]
pub mod testing;

pub use catalog::{ScoredVoice, VoiceCatalog};
pub use errors::{SpeechError, SpeechResult};
pub use language::{LanguageDetector, DEFAULT_FALLBACK_LANGUAGE};
pub use models::{AudioSettings, Gender, GenderPreference, GenderPreferenceMap, SpeechEvent, Utterance, Voice};
pub use narrator::{Narrator, SpeakOutcome};
pub use speech::{CommandSpeech, SilentSpeech, SpeechOutput};
