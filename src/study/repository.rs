//! The card repository seam
//!
//! The session controller talks to card storage only through
//! [`CardRepository`]. Two backends ship with the crate: the REST client in
//! [`super::remote`] and the JSON file store in [`super::storage`].

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use super::models::{CardsResponse, FetchOptions};
use super::settings::UserSettings;

#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Fetch the cards of a deck. A smart-mode backend tags its response
    /// with a `study_session` whose mode is "smart".
    async fn get_cards(&self, deck_id: Uuid, options: FetchOptions) -> RepositoryResult<CardsResponse>;

    /// Record whether the user recalled a card
    async fn update_card_progress(&self, card_id: Uuid, success: bool) -> RepositoryResult<()>;

    /// Fetch the user's study settings
    async fn get_user_settings(&self) -> RepositoryResult<UserSettings>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}
