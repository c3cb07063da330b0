pub mod cards;
pub mod decks;
pub mod detect;
pub mod select;
pub mod study;
pub mod voices;
