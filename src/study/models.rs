//! Data models for study sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deck is a named collection of cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub card_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            card_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A flashcard as served by the card repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front_text: String,
    pub back_text: String,
    /// Language tag of the front side (e.g. "fr-FR")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_language: Option<String>,
    /// Language tag of the back side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_language: Option<String>,
    #[serde(default)]
    pub learned: bool,
    #[serde(default)]
    pub next_review: Option<DateTime<Utc>>,
    /// Consecutive successful reviews, kept by the local store only
    #[serde(default, skip_serializing_if = "is_zero")]
    pub success_streak: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Card {
    pub fn new(deck_id: Uuid, front_text: String, back_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front_text,
            back_text,
            front_language: None,
            back_language: None,
            learned: false,
            next_review: None,
            success_streak: 0,
        }
    }

    /// A card needs review when it is not learned yet or its review date has passed
    pub fn needs_review(&self, now: DateTime<Utc>) -> bool {
        !self.learned || self.next_review.map_or(false, |due| due <= now)
    }

    pub fn text(&self, side: CardSide) -> &str {
        match side {
            CardSide::Front => &self.front_text,
            CardSide::Back => &self.back_text,
        }
    }

    pub fn language(&self, side: CardSide) -> Option<&str> {
        match side {
            CardSide::Front => self.front_language.as_deref(),
            CardSide::Back => self.back_language.as_deref(),
        }
    }
}

/// Which face of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSide {
    Front,
    Back,
}

/// How well the user recalled a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Easy,
    Medium,
    Difficult,
}

impl Grade {
    /// Outcome reported to the repository. Only "difficult" counts as a miss.
    pub fn is_success(self) -> bool {
        self != Grade::Difficult
    }
}

/// Selection mode requested from, and reported by, the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    /// Server ranks and caps the cards
    #[default]
    Smart,
    /// Client filters the raw deck by learned status and due date
    Legacy,
}

impl StudyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyMode::Smart => "smart",
            StudyMode::Legacy => "legacy",
        }
    }
}

/// Options sent along with a card fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub study_mode: StudyMode,
    pub mixed_order: bool,
    pub prioritize_overdue: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            study_mode: StudyMode::Smart,
            mixed_order: false,
            prioritize_overdue: true,
        }
    }
}

/// Server-side session metadata attached to a smart fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySessionInfo {
    /// Raw mode string; anything but "smart" is treated as legacy
    pub study_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

/// Response of a card fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardsResponse {
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_session: Option<StudySessionInfo>,
}

impl CardsResponse {
    pub fn legacy(cards: Vec<Card>) -> Self {
        Self {
            cards,
            study_session: None,
        }
    }

    /// The mode the repository actually served
    pub fn served_mode(&self) -> StudyMode {
        match &self.study_session {
            Some(info) if info.study_mode.eq_ignore_ascii_case("smart") => StudyMode::Smart,
            _ => StudyMode::Legacy,
        }
    }
}
