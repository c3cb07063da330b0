//! In-memory speech backend for tests

use std::sync::Mutex;

use super::errors::{SpeechError, SpeechResult};
use super::models::{SpeechEvent, Utterance, Voice};
use super::speech::{SpeechEvents, SpeechOutput};

#[derive(Default)]
struct MockSpeechState {
    voices: Vec<Voice>,
    spoken: Vec<Utterance>,
    cancels: usize,
    fail_speak: bool,
}

/// Records utterances and cancellations; utterances only end when the test
/// says so
#[derive(Default)]
pub struct MockSpeech {
    state: Mutex<MockSpeechState>,
}

impl MockSpeech {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            state: Mutex::new(MockSpeechState {
                voices,
                ..MockSpeechState::default()
            }),
        }
    }

    pub fn set_voices(&self, voices: Vec<Voice>) {
        self.state.lock().unwrap().voices = voices;
    }

    pub fn fail_speak(&self) {
        self.state.lock().unwrap().fail_speak = true;
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.state.lock().unwrap().spoken.clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|u| u.text).collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.state.lock().unwrap().cancels
    }

    pub fn finish(&self, events: &SpeechEvents, utterance_id: u64) {
        events.send(SpeechEvent::Ended(utterance_id)).unwrap();
    }
}

impl SpeechOutput for MockSpeech {
    fn voices(&self) -> SpeechResult<Vec<Voice>> {
        Ok(self.state.lock().unwrap().voices.clone())
    }

    fn speak(&self, utterance: Utterance, events: SpeechEvents) -> SpeechResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_speak {
            return Err(SpeechError::Engine("mock failure".to_string()));
        }
        let _ = events.send(SpeechEvent::Started(utterance.id));
        state.spoken.push(utterance);
        Ok(())
    }

    fn cancel(&self) {
        self.state.lock().unwrap().cancels += 1;
    }

    fn name(&self) -> &str {
        "mock"
    }
}
