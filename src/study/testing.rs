//! In-memory card repository for tests

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::{RepositoryError, RepositoryResult};
use super::models::{Card, CardsResponse, FetchOptions, StudyMode, StudySessionInfo};
use super::repository::CardRepository;
use super::settings::UserSettings;

#[derive(Default)]
struct MockState {
    cards: Vec<Card>,
    /// Served for smart requests when set
    smart_cards: Option<Vec<Card>>,
    settings: UserSettings,
    settings_delay: Option<Duration>,
    fail_settings: bool,
    fail_fetch: bool,
    fail_progress: bool,
    fetches: Vec<FetchOptions>,
    progress: Vec<(Uuid, bool)>,
}

#[derive(Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            state: Mutex::new(MockState {
                cards,
                ..MockState::default()
            }),
        }
    }

    pub fn set_cards(&self, cards: Vec<Card>) {
        self.state.lock().unwrap().cards = cards;
    }

    pub fn serve_smart(&self, cards: Vec<Card>) {
        self.state.lock().unwrap().smart_cards = Some(cards);
    }

    pub fn set_settings(&self, settings: UserSettings) {
        self.state.lock().unwrap().settings = settings;
    }

    pub fn delay_settings(&self, delay: Duration) {
        self.state.lock().unwrap().settings_delay = Some(delay);
    }

    pub fn fail_settings(&self) {
        self.state.lock().unwrap().fail_settings = true;
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.state.lock().unwrap().fail_fetch = fail;
    }

    pub fn set_fail_progress(&self, fail: bool) {
        self.state.lock().unwrap().fail_progress = fail;
    }

    pub fn fetches(&self) -> Vec<FetchOptions> {
        self.state.lock().unwrap().fetches.clone()
    }

    pub fn progress(&self) -> Vec<(Uuid, bool)> {
        self.state.lock().unwrap().progress.clone()
    }
}

#[async_trait]
impl CardRepository for MockRepository {
    async fn get_cards(&self, _deck_id: Uuid, options: FetchOptions) -> RepositoryResult<CardsResponse> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push(options);
        if state.fail_fetch {
            return Err(RepositoryError::Status {
                status: 500,
                message: "mock fetch failure".to_string(),
            });
        }

        match (&state.smart_cards, options.study_mode) {
            (Some(cards), StudyMode::Smart) => Ok(CardsResponse {
                cards: cards.clone(),
                study_session: Some(StudySessionInfo {
                    study_mode: "smart".to_string(),
                    recommendations: None,
                }),
            }),
            _ => Ok(CardsResponse::legacy(state.cards.clone())),
        }
    }

    async fn update_card_progress(&self, card_id: Uuid, success: bool) -> RepositoryResult<()> {
        let mut state = self.state.lock().unwrap();
        state.progress.push((card_id, success));
        if state.fail_progress {
            return Err(RepositoryError::Status {
                status: 503,
                message: "mock progress failure".to_string(),
            });
        }
        Ok(())
    }

    async fn get_user_settings(&self) -> RepositoryResult<UserSettings> {
        let delay = self.state.lock().unwrap().settings_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.fail_settings {
            return Err(RepositoryError::NotFound("settings".to_string()));
        }
        Ok(state.settings.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
