//! Speech output backends
//!
//! A backend lists its voices, speaks one utterance at a time and reports
//! lifecycle events on a channel. Cancelling is synchronous from the caller's
//! point of view: the pending utterance is signalled and no further `Ended`
//! event will be reported for it.

use std::process::Stdio;
use std::sync::Mutex;

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use super::errors::{SpeechError, SpeechResult};
use super::models::{SpeechEvent, Utterance, Voice};

pub type SpeechEvents = mpsc::UnboundedSender<SpeechEvent>;

/// Platform speech capability
pub trait SpeechOutput: Send + Sync {
    /// Voices currently installed
    fn voices(&self) -> SpeechResult<Vec<Voice>>;

    /// Start speaking. Returns once the utterance is queued, events follow on
    /// `events`.
    fn speak(&self, utterance: Utterance, events: SpeechEvents) -> SpeechResult<()>;

    /// Stop the in-flight utterance, if any
    fn cancel(&self);

    fn name(&self) -> &str;
}

/// Backend that never makes a sound; every utterance ends immediately
#[derive(Debug, Default)]
pub struct SilentSpeech {
    voices: Vec<Voice>,
}

impl SilentSpeech {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }
}

impl SpeechOutput for SilentSpeech {
    fn voices(&self) -> SpeechResult<Vec<Voice>> {
        Ok(self.voices.clone())
    }

    fn speak(&self, utterance: Utterance, events: SpeechEvents) -> SpeechResult<()> {
        log::debug!("[silent] {} ({}): {}", utterance.voice.name, utterance.voice.lang, utterance.text);
        let _ = events.send(SpeechEvent::Started(utterance.id));
        let _ = events.send(SpeechEvent::Ended(utterance.id));
        Ok(())
    }

    fn cancel(&self) {}

    fn name(&self) -> &str {
        "silent"
    }
}

/// Backend driving an espeak-compatible command line synthesizer
pub struct CommandSpeech {
    program: String,
    in_flight: Mutex<Option<(u64, oneshot::Sender<()>)>>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            in_flight: Mutex::new(None),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args(utterance: &Utterance) -> Vec<String> {
        let words_per_minute = (175.0 * utterance.rate).round().clamp(80.0, 450.0) as u32;
        let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;
        let amplitude = (100.0 * utterance.volume).round().clamp(0.0, 200.0) as u32;

        vec![
            "-v".to_string(),
            utterance.voice.lang.to_lowercase(),
            "-s".to_string(),
            words_per_minute.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            "--".to_string(),
            utterance.text.clone(),
        ]
    }

    fn take_in_flight(&self) -> Option<(u64, oneshot::Sender<()>)> {
        match self.in_flight.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl SpeechOutput for CommandSpeech {
    fn voices(&self) -> SpeechResult<Vec<Voice>> {
        let output = std::process::Command::new(&self.program).arg("--voices").output()?;
        if !output.status.success() {
            return Err(SpeechError::Engine(format!(
                "{} --voices exited with {}",
                self.program, output.status
            )));
        }
        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn speak(&self, utterance: Utterance, events: SpeechEvents) -> SpeechResult<()> {
        self.cancel();

        let mut child = Command::new(&self.program)
            .args(Self::args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let (cancel_tx, cancel_rx) = oneshot::channel();
        match self.in_flight.lock() {
            Ok(mut guard) => *guard = Some((utterance.id, cancel_tx)),
            Err(poisoned) => *poisoned.into_inner() = Some((utterance.id, cancel_tx)),
        }

        let id = utterance.id;
        let _ = events.send(SpeechEvent::Started(id));

        tokio::spawn(async move {
            let finished = tokio::select! {
                status = child.wait() => Some(status),
                _ = cancel_rx => None,
            };

            let event = match finished {
                Some(Ok(status)) if status.success() => SpeechEvent::Ended(id),
                Some(Ok(status)) => SpeechEvent::Error {
                    utterance_id: id,
                    message: format!("synthesizer exited with {}", status),
                },
                Some(Err(e)) => SpeechEvent::Error {
                    utterance_id: id,
                    message: e.to_string(),
                },
                None => {
                    if let Err(e) = child.kill().await {
                        log::debug!("Failed to stop utterance {}: {}", id, e);
                    }
                    SpeechEvent::Cancelled(id)
                }
            };
            let _ = events.send(event);
        });

        Ok(())
    }

    fn cancel(&self) {
        if let Some((id, cancel)) = self.take_in_flight() {
            log::debug!("Cancelling utterance {}", id);
            // The task may already have finished
            let _ = cancel.send(());
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 2)
/// ```
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 4 {
                return None;
            }
            let gender = match columns[2].rsplit('/').next() {
                Some("F") => " female",
                Some("M") => " male",
                _ => "",
            };
            let name = format!("{}{}", columns[3].replace('_', " "), gender);
            Some(Voice::new(name, columns[1], true))
        })
        .collect()
}
