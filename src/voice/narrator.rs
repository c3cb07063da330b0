//! Narrator: speaks card text with the best available voice
//!
//! Owns the voice catalog and guarantees at most one utterance in flight.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::catalog::VoiceCatalog;
use super::errors::SpeechError;
use super::language::LanguageDetector;
use super::models::{AudioSettings, GenderPreferenceMap, SpeechEvent, Utterance};
use super::speech::SpeechOutput;

/// Result of a request to speak
#[derive(Debug)]
pub enum SpeakOutcome {
    Spoken { voice: String, language: String },
    /// Audio is disabled or there was nothing to say
    Muted,
    /// The speech service offers no voices at all
    NoVoice,
    Failed(SpeechError),
}

impl SpeakOutcome {
    pub fn is_spoken(&self) -> bool {
        matches!(self, SpeakOutcome::Spoken { .. })
    }
}

pub struct Narrator {
    output: Arc<dyn SpeechOutput>,
    catalog: VoiceCatalog,
    detector: LanguageDetector,
    settings: AudioSettings,
    events_tx: mpsc::UnboundedSender<SpeechEvent>,
    events_rx: mpsc::UnboundedReceiver<SpeechEvent>,
    next_utterance_id: u64,
    current: Option<u64>,
}

impl Narrator {
    pub fn new(output: Arc<dyn SpeechOutput>, detector: LanguageDetector) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut narrator = Self {
            output,
            catalog: VoiceCatalog::new(),
            detector,
            settings: AudioSettings::default(),
            events_tx,
            events_rx,
            next_utterance_id: 1,
            current: None,
        };
        narrator.refresh_voices();
        narrator
    }

    /// Re-read the voice list from the speech service. Returns the number of
    /// voices indexed.
    pub fn refresh_voices(&mut self) -> usize {
        match self.output.voices() {
            Ok(voices) => {
                self.catalog.refresh(voices);
                log::info!("Loaded {} voices from {}", self.catalog.len(), self.output.name());
            }
            Err(e) => {
                log::warn!("Failed to list voices from {}: {}", self.output.name(), e);
                self.catalog.refresh(Vec::new());
            }
        }
        self.catalog.len()
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
    }

    pub fn set_gender_preferences(&mut self, preferences: GenderPreferenceMap) {
        self.catalog.set_preferences(preferences);
    }

    /// Language to narrate `text` in: the explicit tag when present, detected
    /// otherwise
    pub fn resolve_language(&self, text: &str, explicit: Option<&str>) -> String {
        match explicit.map(str::trim).filter(|tag| !tag.is_empty()) {
            Some(tag) => tag.to_string(),
            None => self.detector.detect(text),
        }
    }

    /// Speak `text`, interrupting whatever is playing
    pub fn speak(&mut self, text: &str, explicit_language: Option<&str>) -> SpeakOutcome {
        if !self.settings.enabled || text.trim().is_empty() {
            return SpeakOutcome::Muted;
        }

        self.cancel();

        let language = self.resolve_language(text, explicit_language);
        let voice = match self.catalog.best_voice(&language, None) {
            Some(scored) => scored.voice.clone(),
            None => {
                log::debug!("No voice available for {}", language);
                return SpeakOutcome::NoVoice;
            }
        };

        let id = self.next_utterance_id;
        self.next_utterance_id += 1;

        let utterance = Utterance {
            id,
            text: text.to_string(),
            voice: voice.clone(),
            rate: self.settings.speed,
            pitch: self.settings.pitch,
            volume: self.settings.volume,
        };

        match self.output.speak(utterance, self.events_tx.clone()) {
            Ok(()) => {
                self.current = Some(id);
                SpeakOutcome::Spoken {
                    voice: voice.name,
                    language,
                }
            }
            Err(e) => {
                log::warn!("Speech failed with voice {}: {}", voice.name, e);
                SpeakOutcome::Failed(e)
            }
        }
    }

    /// Stop the in-flight utterance
    pub fn cancel(&mut self) {
        if let Some(id) = self.current.take() {
            log::debug!("Interrupting utterance {}", id);
        }
        self.output.cancel();
    }

    pub fn is_speaking(&mut self) -> bool {
        self.drain_events();
        self.current.is_some()
    }

    /// Collect pending speech events. Errors are logged and otherwise ignored.
    pub fn drain_events(&mut self) -> Vec<SpeechEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            let finished = match &event {
                SpeechEvent::Started(_) => None,
                SpeechEvent::Ended(id) | SpeechEvent::Cancelled(id) => Some(*id),
                SpeechEvent::Error { utterance_id, message } => {
                    log::warn!("Utterance {} failed: {}", utterance_id, message);
                    Some(*utterance_id)
                }
            };
            if finished.is_some() && finished == self.current {
                self.current = None;
            }
            events.push(event);
        }
        events
    }
}
