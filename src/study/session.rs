//! Study session controller
//!
//! State machine driving one pass through a deck:
//!
//! ```text
//! Idle -> Loading -> Active(index, visit) -> Completed
//!                 \-> NoCardsAvailable
//! ```
//!
//! Every command takes `&mut self`, so commands never overlap. `mark_card`
//! advances the local position before the outcome is persisted, which keeps
//! a card occurrence from being reported twice.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Serialize;
use uuid::Uuid;

use super::errors::{StudyError, StudyResult};
use super::models::{Card, CardSide, FetchOptions, Grade, StudyMode};
use super::progress::{format_elapsed, progress_label, remaining, SessionClock, StudyStats};
use super::repository::CardRepository;
use super::selector::select_cards_for_session;
use super::settings::{load_settings, UserSettings};
use crate::voice::{Narrator, SpeakOutcome};

/// How long `start` waits for user settings before using defaults
pub const DEFAULT_SETTINGS_TIMEOUT: Duration = Duration::from_secs(5);

/// Reveal state of the current card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardVisit {
    /// Front shown, answer not revealed yet
    Unseen,
    /// Flipped back to the front after revealing
    Front,
    Back,
}

impl CardVisit {
    pub fn flipped(self) -> Self {
        match self {
            CardVisit::Unseen | CardVisit::Front => CardVisit::Back,
            CardVisit::Back => CardVisit::Front,
        }
    }

    pub fn is_flipped(self) -> bool {
        self == CardVisit::Back
    }

    pub fn grading_visible(self) -> bool {
        self != CardVisit::Unseen
    }

    pub fn instructions_visible(self) -> bool {
        self == CardVisit::Unseen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Active { index: usize, visit: CardVisit },
    Completed,
    NoCardsAvailable,
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Loading => "loading",
            SessionPhase::Active { .. } => "active",
            SessionPhase::Completed => "completed",
            SessionPhase::NoCardsAvailable => "no_cards_available",
        }
    }
}

/// Result of grading a card
#[derive(Debug)]
pub struct MarkOutcome {
    pub completed: bool,
    /// Set when the repository rejected the outcome. The session has
    /// advanced regardless.
    pub persistence_error: Option<StudyError>,
}

/// Read-only snapshot for renderers
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: &'static str,
    pub deck_id: Option<Uuid>,
    pub mode: StudyMode,
    pub progress_label: String,
    pub remaining: usize,
    pub stats: StudyStats,
    pub success_rate: u32,
    pub front_text: Option<String>,
    /// Only present while the back is showing
    pub back_text: Option<String>,
    pub is_flipped: bool,
    pub grading_visible: bool,
    pub instructions_visible: bool,
    pub elapsed: Option<String>,
    pub over_budget: bool,
}

pub struct SessionController {
    repository: Arc<dyn CardRepository>,
    narrator: Narrator,
    options: FetchOptions,
    settings_timeout: Duration,
    settings: UserSettings,
    phase: SessionPhase,
    deck_id: Option<Uuid>,
    study_cards: Vec<Card>,
    mode: StudyMode,
    stats: StudyStats,
    clock: Option<SessionClock>,
}

impl SessionController {
    pub fn new(repository: Arc<dyn CardRepository>, narrator: Narrator) -> Self {
        Self {
            repository,
            narrator,
            options: FetchOptions::default(),
            settings_timeout: DEFAULT_SETTINGS_TIMEOUT,
            settings: UserSettings::default(),
            phase: SessionPhase::Idle,
            deck_id: None,
            study_cards: Vec::new(),
            mode: StudyMode::Legacy,
            stats: StudyStats::default(),
            clock: None,
        }
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_settings_timeout(mut self, timeout: Duration) -> Self {
        self.settings_timeout = timeout;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn stats(&self) -> StudyStats {
        self.stats
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn deck_id(&self) -> Option<Uuid> {
        self.deck_id
    }

    pub fn study_cards(&self) -> &[Card] {
        &self.study_cards
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn narrator_mut(&mut self) -> &mut Narrator {
        &mut self.narrator
    }

    /// Cards graded so far in this session
    pub fn current_index(&self) -> usize {
        match self.phase {
            SessionPhase::Active { index, .. } => index,
            SessionPhase::Completed => self.study_cards.len(),
            _ => 0,
        }
    }

    pub fn current_card(&self) -> Option<&Card> {
        match self.phase {
            SessionPhase::Active { index, .. } => self.study_cards.get(index),
            _ => None,
        }
    }

    fn invalid(&self, command: &'static str) -> StudyError {
        StudyError::InvalidState {
            command,
            phase: self.phase.name(),
        }
    }

    /// Fetch and select the cards of `deck_id` and begin a session. On fetch
    /// failure the previous state is kept.
    pub async fn start(&mut self, deck_id: Uuid) -> StudyResult<()> {
        let previous = std::mem::replace(&mut self.phase, SessionPhase::Loading);
        self.narrator.cancel();

        let settings = load_settings(self.repository.as_ref(), self.settings_timeout).await;
        let response = match self.repository.get_cards(deck_id, self.options).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Failed to fetch cards for deck {}: {}", deck_id, e);
                self.phase = previous;
                return Err(StudyError::Fetch(e));
            }
        };

        self.apply_settings(settings);
        self.deck_id = Some(deck_id);

        let mut selection = select_cards_for_session(response, &self.settings, Utc::now());
        if selection.mode == StudyMode::Legacy && self.options.mixed_order {
            selection.cards.shuffle(&mut rand::thread_rng());
        }

        log::info!(
            "Starting {} session on deck {} with {} cards ({} due)",
            selection.mode.as_str(),
            deck_id,
            selection.cards.len(),
            selection.due_count
        );
        self.begin(selection.cards, selection.mode);
        Ok(())
    }

    /// Re-run `start` on the current deck
    pub async fn restart(&mut self) -> StudyResult<()> {
        let deck_id = self.deck_id.ok_or(StudyError::NoDeck)?;
        self.start(deck_id).await
    }

    /// Study every card of the deck regardless of due dates. Uncapped and in
    /// deck order.
    pub async fn practice_all(&mut self) -> StudyResult<()> {
        if !matches!(self.phase, SessionPhase::NoCardsAvailable | SessionPhase::Completed) {
            return Err(self.invalid("practice all"));
        }
        let deck_id = self.deck_id.ok_or(StudyError::NoDeck)?;

        let previous = std::mem::replace(&mut self.phase, SessionPhase::Loading);
        let options = FetchOptions {
            study_mode: StudyMode::Legacy,
            mixed_order: false,
            prioritize_overdue: false,
        };
        let response = match self.repository.get_cards(deck_id, options).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Failed to fetch cards for deck {}: {}", deck_id, e);
                self.phase = previous;
                return Err(StudyError::Fetch(e));
            }
        };

        log::info!("Practicing all {} cards of deck {}", response.cards.len(), deck_id);
        self.begin(response.cards, StudyMode::Legacy);
        Ok(())
    }

    fn apply_settings(&mut self, settings: UserSettings) {
        self.narrator.set_settings(settings.audio_settings());
        self.narrator.set_gender_preferences(settings.gender_preferences());
        self.settings = settings;
    }

    fn begin(&mut self, cards: Vec<Card>, mode: StudyMode) {
        self.stats = StudyStats::new(cards.len());
        self.study_cards = cards;
        self.mode = mode;

        if self.study_cards.is_empty() {
            self.phase = SessionPhase::NoCardsAvailable;
            self.clock = None;
            return;
        }

        self.clock = Some(SessionClock::start(self.settings.default_session_duration));
        self.phase = SessionPhase::Active {
            index: 0,
            visit: CardVisit::Unseen,
        };
        self.load_card();
    }

    fn load_card(&mut self) {
        self.narrator.cancel();
        if self.narrator.settings().auto_play {
            self.narrate(CardSide::Front);
        }
    }

    fn narrate(&mut self, side: CardSide) -> SpeakOutcome {
        let Some(card) = self.current_card() else {
            return SpeakOutcome::Muted;
        };
        let text = card.text(side).to_string();
        let language = card.language(side).map(str::to_string);
        self.narrator.speak(&text, language.as_deref())
    }

    /// Toggle the current card between front and back
    pub fn flip(&mut self) -> StudyResult<CardVisit> {
        let SessionPhase::Active { index, visit } = self.phase else {
            return Err(self.invalid("flip"));
        };

        let visit = visit.flipped();
        self.phase = SessionPhase::Active { index, visit };

        if visit == CardVisit::Back && self.narrator.settings().auto_play {
            self.narrate(CardSide::Back);
        }
        Ok(visit)
    }

    /// Grade the current card and move to the next one
    pub async fn mark_card(&mut self, grade: Grade) -> StudyResult<MarkOutcome> {
        let (index, card_id) = match self.phase {
            SessionPhase::Active {
                visit: CardVisit::Unseen,
                ..
            } => return Err(self.invalid("grade an unrevealed card")),
            SessionPhase::Active { index, .. } => match self.study_cards.get(index) {
                Some(card) => (index, card.id),
                None => return Err(self.invalid("mark card")),
            },
            _ => return Err(self.invalid("mark card")),
        };

        self.stats.record(grade);
        let next = index + 1;
        let completed = next >= self.study_cards.len();
        if completed {
            self.narrator.cancel();
            self.phase = SessionPhase::Completed;
            log::info!(
                "Session complete: {} easy, {} medium, {} difficult",
                self.stats.correct,
                self.stats.medium,
                self.stats.difficult
            );
        } else {
            self.phase = SessionPhase::Active {
                index: next,
                visit: CardVisit::Unseen,
            };
            self.load_card();
        }

        let persistence_error = match self
            .repository
            .update_card_progress(card_id, grade.is_success())
            .await
        {
            Ok(()) => None,
            Err(source) => {
                log::warn!("Failed to save progress for card {}: {}", card_id, source);
                Some(StudyError::Persistence { card_id, source })
            }
        };

        Ok(MarkOutcome {
            completed,
            persistence_error,
        })
    }

    /// Narrate one side of the current card
    pub fn speak(&mut self, side: CardSide) -> StudyResult<SpeakOutcome> {
        if !matches!(self.phase, SessionPhase::Active { .. }) {
            return Err(self.invalid("speak"));
        }
        Ok(self.narrate(side))
    }

    /// Leave the session. Returns the final stats when one was running.
    pub fn exit(&mut self) -> Option<StudyStats> {
        self.narrator.cancel();
        let stats = match self.phase {
            SessionPhase::Active { .. } | SessionPhase::Completed | SessionPhase::NoCardsAvailable => {
                Some(self.stats)
            }
            SessionPhase::Idle | SessionPhase::Loading => None,
        };

        self.phase = SessionPhase::Idle;
        self.deck_id = None;
        self.study_cards.clear();
        self.stats = StudyStats::default();
        self.clock = None;
        stats
    }

    /// Re-index voices after the speech service reported a change
    pub fn on_voices_changed(&mut self) -> usize {
        self.narrator.refresh_voices()
    }

    pub fn snapshot(&self) -> SessionView {
        let total = self.study_cards.len();
        let index = self.current_index();
        let visit = match self.phase {
            SessionPhase::Active { visit, .. } => Some(visit),
            _ => None,
        };
        let card = self.current_card();
        let now = Utc::now();

        SessionView {
            phase: self.phase.name(),
            deck_id: self.deck_id,
            mode: self.mode,
            progress_label: progress_label(index, total),
            remaining: remaining(index, total),
            stats: self.stats,
            success_rate: self.stats.success_rate(),
            front_text: card.map(|c| c.front_text.clone()),
            back_text: card
                .filter(|_| visit.map_or(false, CardVisit::is_flipped))
                .map(|c| c.back_text.clone()),
            is_flipped: visit.map_or(false, CardVisit::is_flipped),
            grading_visible: visit.map_or(false, CardVisit::grading_visible),
            instructions_visible: visit.map_or(false, CardVisit::instructions_visible),
            elapsed: self.clock.map(|c| format_elapsed(c.elapsed(now))),
            over_budget: self.clock.map_or(false, |c| c.is_over_budget(now)),
        }
    }
}
