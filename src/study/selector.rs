//! Card selection for a study session
//!
//! Smart responses are already ranked and capped by the server and pass
//! through untouched. Legacy responses are filtered here:
//!
//! - cards needing review (not learned, or due) come first, in deck order
//! - remaining cards fill the session up to the cap
//!
//! A deck with nothing due therefore still yields a practice session of up
//! to `cards_per_session` cards, and an empty deck yields an empty session.

use chrono::{DateTime, Utc};

use super::models::{Card, CardsResponse, StudyMode};
use super::settings::UserSettings;

/// Cards chosen for a session, with the mode that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub cards: Vec<Card>,
    pub mode: StudyMode,
    /// Number of selected cards that were actually due
    pub due_count: usize,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Select the cards to study from a repository response
pub fn select_cards_for_session(
    response: CardsResponse,
    settings: &UserSettings,
    now: DateTime<Utc>,
) -> Selection {
    match response.served_mode() {
        StudyMode::Smart => {
            let due_count = response.cards.iter().filter(|c| c.needs_review(now)).count();
            Selection {
                cards: response.cards,
                mode: StudyMode::Smart,
                due_count,
            }
        }
        StudyMode::Legacy => select_legacy(response.cards, settings.session_cap(), now),
    }
}

/// Due cards first, then non-due cards to fill the quota, capped
pub fn select_legacy(raw: Vec<Card>, cap: usize, now: DateTime<Utc>) -> Selection {
    let (due, rest): (Vec<Card>, Vec<Card>) = raw.into_iter().partition(|c| c.needs_review(now));
    let due_count = due.len().min(cap);

    if due.is_empty() && !rest.is_empty() {
        log::info!(
            "No cards due, practicing {} of {} cards",
            rest.len().min(cap),
            rest.len()
        );
    } else if due.len() < cap && !rest.is_empty() {
        log::debug!(
            "{} cards due, filling session with up to {} more",
            due.len(),
            cap - due.len()
        );
    }

    let cards: Vec<Card> = due.into_iter().chain(rest).take(cap).collect();

    Selection {
        cards,
        mode: StudyMode::Legacy,
        due_count,
    }
}
