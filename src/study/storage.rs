//! JSON file card repository
//!
//! Directory structure:
//! ```text
//! {data_dir}/
//! ├── decks.json           # Array of all decks
//! ├── settings.json        # User study settings
//! └── cards/
//!     └── {deck-id}.json   # Array of the deck's cards
//! ```
//!
//! This backend always serves legacy responses: the session controller
//! filters due cards itself.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::errors::{RepositoryError, RepositoryResult};
use super::models::{Card, CardsResponse, Deck, FetchOptions};
use super::repository::CardRepository;
use super::settings::UserSettings;

/// Days until the next review after `streak` consecutive successes
fn review_interval_days(streak: u32) -> i64 {
    match streak {
        0 => 0,
        1 => 1,
        2 => 6,
        n => (6.0 * 2.5f64.powi(n as i32 - 2)).round().min(365.0) as i64,
    }
}

/// Apply one review outcome to a card
pub fn record_outcome(card: &mut Card, success: bool, required_reviews: u32, now: DateTime<Utc>) {
    if success {
        card.success_streak += 1;
        if card.success_streak >= required_reviews.max(1) {
            card.learned = true;
        }
        card.next_review = Some(now + Duration::days(review_interval_days(card.success_streak)));
    } else {
        card.success_streak = 0;
        card.learned = false;
        card.next_review = None;
    }
}

/// Storage manager for decks, cards and settings on disk
pub struct LocalCardRepository {
    data_dir: PathBuf,
}

impl LocalCardRepository {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn decks_path(&self) -> PathBuf {
        self.data_dir.join("decks.json")
    }

    fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    fn cards_dir(&self) -> PathBuf {
        self.data_dir.join("cards")
    }

    fn cards_path(&self, deck_id: Uuid) -> PathBuf {
        self.cards_dir().join(format!("{}.json", deck_id))
    }

    /// Create the directory layout
    pub fn init(&self) -> RepositoryResult<()> {
        fs::create_dir_all(self.cards_dir())?;

        let decks_path = self.decks_path();
        if !decks_path.exists() {
            let empty_decks: Vec<Deck> = Vec::new();
            fs::write(&decks_path, serde_json::to_string_pretty(&empty_decks)?)?;
        }

        Ok(())
    }

    // ==================== Deck Operations ====================

    pub fn list_decks(&self) -> RepositoryResult<Vec<Deck>> {
        let decks_path = self.decks_path();
        if !decks_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&decks_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn get_deck(&self, deck_id: Uuid) -> RepositoryResult<Deck> {
        self.list_decks()?
            .into_iter()
            .find(|d| d.id == deck_id)
            .ok_or(RepositoryError::DeckNotFound(deck_id))
    }

    /// Find a deck by id or by case-insensitive name
    pub fn resolve_deck(&self, key: &str) -> RepositoryResult<Deck> {
        let decks = self.list_decks()?;
        if let Ok(id) = Uuid::parse_str(key) {
            return decks
                .into_iter()
                .find(|d| d.id == id)
                .ok_or(RepositoryError::DeckNotFound(id));
        }
        decks
            .into_iter()
            .find(|d| d.name.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| RepositoryError::NotFound(format!("deck '{}'", key)))
    }

    pub fn create_deck(&self, name: String, description: Option<String>) -> RepositoryResult<Deck> {
        self.init()?;

        let mut deck = Deck::new(name);
        deck.description = description;

        let mut decks = self.list_decks()?;
        decks.push(deck.clone());
        self.write_decks(&decks)?;
        self.write_cards(deck.id, &[])?;

        log::info!("Created deck {} ({})", deck.name, deck.id);
        Ok(deck)
    }

    fn write_decks(&self, decks: &[Deck]) -> RepositoryResult<()> {
        fs::write(self.decks_path(), serde_json::to_string_pretty(decks)?)?;
        Ok(())
    }

    // ==================== Card Operations ====================

    pub fn list_cards(&self, deck_id: Uuid) -> RepositoryResult<Vec<Card>> {
        let cards_path = self.cards_path(deck_id);
        if !cards_path.exists() {
            // Known deck without cards yet
            self.get_deck(deck_id)?;
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&cards_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_cards(&self, deck_id: Uuid, cards: &[Card]) -> RepositoryResult<()> {
        fs::create_dir_all(self.cards_dir())?;
        fs::write(self.cards_path(deck_id), serde_json::to_string_pretty(cards)?)?;
        Ok(())
    }

    pub fn add_card(
        &self,
        deck_id: Uuid,
        front: String,
        back: String,
        front_language: Option<String>,
        back_language: Option<String>,
    ) -> RepositoryResult<Card> {
        let mut decks = self.list_decks()?;
        let deck = decks
            .iter_mut()
            .find(|d| d.id == deck_id)
            .ok_or(RepositoryError::DeckNotFound(deck_id))?;

        let mut card = Card::new(deck_id, front, back);
        card.front_language = front_language;
        card.back_language = back_language;

        let mut cards = self.list_cards(deck_id)?;
        cards.push(card.clone());
        self.write_cards(deck_id, &cards)?;

        deck.card_count = cards.len();
        deck.updated_at = Utc::now();
        self.write_decks(&decks)?;

        Ok(card)
    }

    /// Locate a card across all decks
    fn find_card(&self, card_id: Uuid) -> RepositoryResult<(Uuid, Vec<Card>, usize)> {
        for deck in self.list_decks()? {
            let cards = self.list_cards(deck.id)?;
            if let Some(pos) = cards.iter().position(|c| c.id == card_id) {
                return Ok((deck.id, cards, pos));
            }
        }
        Err(RepositoryError::CardNotFound(card_id))
    }

    // ==================== Settings ====================

    pub fn load_settings(&self) -> RepositoryResult<UserSettings> {
        let settings_path = self.settings_path();
        if !settings_path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(&settings_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_settings(&self, settings: &UserSettings) -> RepositoryResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(self.settings_path(), serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }
}

#[async_trait]
impl CardRepository for LocalCardRepository {
    async fn get_cards(&self, deck_id: Uuid, _options: FetchOptions) -> RepositoryResult<CardsResponse> {
        Ok(CardsResponse::legacy(self.list_cards(deck_id)?))
    }

    async fn update_card_progress(&self, card_id: Uuid, success: bool) -> RepositoryResult<()> {
        let required = self.load_settings()?.required_reviews_to_learn;
        let (deck_id, mut cards, pos) = self.find_card(card_id)?;

        record_outcome(&mut cards[pos], success, required, Utc::now());
        log::debug!(
            "Card {} streak {} learned {}",
            card_id,
            cards[pos].success_streak,
            cards[pos].learned
        );

        self.write_cards(deck_id, &cards)
    }

    async fn get_user_settings(&self) -> RepositoryResult<UserSettings> {
        self.load_settings()
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (LocalCardRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalCardRepository::new(temp_dir.path().to_path_buf());
        (repo, temp_dir)
    }

    #[test]
    fn test_create_and_list_decks() {
        let (repo, _temp) = setup();
        assert!(repo.list_decks().unwrap().is_empty());

        let deck = repo.create_deck("French".to_string(), Some("A1 vocabulary".to_string())).unwrap();
        let decks = repo.list_decks().unwrap();

        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].id, deck.id);
        assert_eq!(repo.resolve_deck("french").unwrap().id, deck.id);
        assert_eq!(repo.resolve_deck(&deck.id.to_string()).unwrap().name, "French");
        assert!(repo.resolve_deck("German").is_err());
    }

    #[test]
    fn test_add_card_updates_count() {
        let (repo, _temp) = setup();
        let deck = repo.create_deck("German".to_string(), None).unwrap();

        repo.add_card(deck.id, "Hund".to_string(), "dog".to_string(), Some("de-DE".to_string()), None)
            .unwrap();
        repo.add_card(deck.id, "Katze".to_string(), "cat".to_string(), None, None).unwrap();

        let cards = repo.list_cards(deck.id).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front_language.as_deref(), Some("de-DE"));
        assert_eq!(repo.get_deck(deck.id).unwrap().card_count, 2);
    }

    #[test]
    fn test_unknown_deck() {
        let (repo, _temp) = setup();
        let missing = Uuid::new_v4();
        assert!(matches!(repo.list_cards(missing), Err(RepositoryError::DeckNotFound(_))));
        assert!(matches!(
            repo.add_card(missing, "a".to_string(), "b".to_string(), None, None),
            Err(RepositoryError::DeckNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_cards_is_legacy() {
        let (repo, _temp) = setup();
        let deck = repo.create_deck("Spanish".to_string(), None).unwrap();
        repo.add_card(deck.id, "perro".to_string(), "dog".to_string(), None, None).unwrap();

        let response = repo.get_cards(deck.id, FetchOptions::default()).await.unwrap();
        assert_eq!(response.cards.len(), 1);
        assert!(response.study_session.is_none());
    }

    #[tokio::test]
    async fn test_progress_streak_bookkeeping() {
        let (repo, _temp) = setup();
        repo.save_settings(&UserSettings {
            required_reviews_to_learn: 2,
            ..UserSettings::default()
        })
        .unwrap();
        let deck = repo.create_deck("Italian".to_string(), None).unwrap();
        let card = repo.add_card(deck.id, "gatto".to_string(), "cat".to_string(), None, None).unwrap();

        repo.update_card_progress(card.id, true).await.unwrap();
        let stored = &repo.list_cards(deck.id).unwrap()[0];
        assert_eq!(stored.success_streak, 1);
        assert!(!stored.learned);

        repo.update_card_progress(card.id, true).await.unwrap();
        let stored = &repo.list_cards(deck.id).unwrap()[0];
        assert_eq!(stored.success_streak, 2);
        assert!(stored.learned);
        assert!(!stored.needs_review(Utc::now()));

        repo.update_card_progress(card.id, false).await.unwrap();
        let stored = &repo.list_cards(deck.id).unwrap()[0];
        assert_eq!(stored.success_streak, 0);
        assert!(!stored.learned);
        assert!(stored.needs_review(Utc::now()));
    }

    #[tokio::test]
    async fn test_progress_unknown_card() {
        let (repo, _temp) = setup();
        repo.create_deck("Dutch".to_string(), None).unwrap();
        let result = repo.update_card_progress(Uuid::new_v4(), true).await;
        assert!(matches!(result, Err(RepositoryError::CardNotFound(_))));
    }

    #[tokio::test]
    async fn test_settings_default_when_missing() {
        let (repo, _temp) = setup();
        let settings = repo.get_user_settings().await.unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_review_intervals_grow() {
        assert_eq!(review_interval_days(1), 1);
        assert_eq!(review_interval_days(2), 6);
        assert_eq!(review_interval_days(3), 15);
        assert_eq!(review_interval_days(20), 365);
    }
}
