//! Data models for speech narration

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A voice offered by the speech service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub name: String,
    /// BCP-47 style tag, e.g. "en-US"
    pub lang: String,
    /// Platform-native voice rather than a networked one
    #[serde(default)]
    pub is_local_service: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, is_local_service: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            is_local_service,
        }
    }
}

/// Gender detected from a voice name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Unknown => write!(f, "unknown"),
        }
    }
}

/// Preferred narrator gender for a language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    Male,
    Female,
    #[default]
    Auto,
}

impl GenderPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderPreference::Male => "male",
            GenderPreference::Female => "female",
            GenderPreference::Auto => "auto",
        }
    }

    /// The gender a voice must have to satisfy this preference
    pub fn target(&self) -> Option<Gender> {
        match self {
            GenderPreference::Male => Some(Gender::Male),
            GenderPreference::Female => Some(Gender::Female),
            GenderPreference::Auto => None,
        }
    }
}

impl FromStr for GenderPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(GenderPreference::Male),
            "female" => Ok(GenderPreference::Female),
            "auto" | "" => Ok(GenderPreference::Auto),
            other => Err(format!("Unknown gender preference: {}", other)),
        }
    }
}

/// Normalize a language tag for comparison: lowercase, '-' separators
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

/// Primary language subtag ("fr" for "fr-CA")
pub fn primary_subtag(tag: &str) -> String {
    let normalized = normalize_tag(tag);
    match normalized.split_once('-') {
        Some((primary, _)) => primary.to_string(),
        None => normalized,
    }
}

/// Language tag to gender preference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenderPreferenceMap {
    entries: HashMap<String, GenderPreference>,
}

impl GenderPreferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, language: &str, preference: GenderPreference) {
        self.entries.insert(normalize_tag(language), preference);
    }

    /// Exact tag first, then the primary subtag, else auto
    pub fn get(&self, language: &str) -> GenderPreference {
        self.entries
            .get(&normalize_tag(language))
            .or_else(|| self.entries.get(&primary_subtag(language)))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Playback settings for narration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    pub enabled: bool,
    /// Speech rate multiplier
    pub speed: f32,
    pub pitch: f32,
    pub volume: f32,
    pub auto_play: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 0.9,
            pitch: 1.0,
            volume: 1.0,
            auto_play: false,
        }
    }
}

/// A request to speak one piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    pub voice: Voice,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Lifecycle signals of an utterance
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Started(u64),
    Ended(u64),
    Cancelled(u64),
    Error { utterance_id: u64, message: String },
}
