//! User study settings and their resolution

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::repository::CardRepository;
use crate::voice::{AudioSettings, GenderPreference, GenderPreferenceMap};

/// Prefix of the per-language gender preference keys
const GENDER_KEY_PREFIX: &str = "preferred_gender_";

pub const DEFAULT_CARDS_PER_SESSION: usize = 20;

/// Study settings as stored by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_cards_per_session")]
    pub cards_per_session: usize,
    /// Planned session length in minutes
    #[serde(default = "default_session_duration")]
    pub default_session_duration: u32,
    #[serde(default = "default_required_reviews")]
    pub required_reviews_to_learn: u32,
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    #[serde(default = "default_audio_speed")]
    pub audio_speed: f32,
    #[serde(default)]
    pub auto_play_audio: bool,
    /// Remaining keys, including `preferred_gender_<language>` entries
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_cards_per_session() -> usize {
    DEFAULT_CARDS_PER_SESSION
}

fn default_session_duration() -> u32 {
    20
}

fn default_required_reviews() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_audio_speed() -> f32 {
    0.9
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            cards_per_session: default_cards_per_session(),
            default_session_duration: default_session_duration(),
            required_reviews_to_learn: default_required_reviews(),
            audio_enabled: true,
            audio_speed: default_audio_speed(),
            auto_play_audio: false,
            extra: BTreeMap::new(),
        }
    }
}

impl UserSettings {
    /// Session size cap; a zero setting means the default
    pub fn session_cap(&self) -> usize {
        if self.cards_per_session == 0 {
            DEFAULT_CARDS_PER_SESSION
        } else {
            self.cards_per_session
        }
    }

    pub fn audio_settings(&self) -> AudioSettings {
        AudioSettings {
            enabled: self.audio_enabled,
            speed: self.audio_speed,
            auto_play: self.auto_play_audio,
            ..AudioSettings::default()
        }
    }

    /// Collect `preferred_gender_<language>` keys. Unparseable values are
    /// treated as "auto".
    pub fn gender_preferences(&self) -> GenderPreferenceMap {
        let mut map = GenderPreferenceMap::new();
        for (key, value) in &self.extra {
            let Some(language) = key.strip_prefix(GENDER_KEY_PREFIX) else {
                continue;
            };
            let preference = value
                .as_str()
                .and_then(|v| v.parse::<GenderPreference>().ok())
                .unwrap_or(GenderPreference::Auto);
            map.set(language, preference);
        }
        map
    }

    pub fn set_gender_preference(&mut self, language: &str, preference: GenderPreference) {
        self.extra.insert(
            format!("{}{}", GENDER_KEY_PREFIX, language),
            serde_json::Value::String(preference.as_str().to_string()),
        );
    }
}

/// Resolve the user's settings, substituting defaults when the repository
/// fails or does not answer within `timeout`.
pub async fn load_settings(repository: &dyn CardRepository, timeout: Duration) -> UserSettings {
    match tokio::time::timeout(timeout, repository.get_user_settings()).await {
        Ok(Ok(settings)) => settings,
        Ok(Err(e)) => {
            log::warn!(
                "Failed to load settings from {}, using defaults: {}",
                repository.name(),
                e
            );
            UserSettings::default()
        }
        Err(_) => {
            log::warn!(
                "Settings from {} not ready after {:?}, using defaults",
                repository.name(),
                timeout
            );
            UserSettings::default()
        }
    }
}
