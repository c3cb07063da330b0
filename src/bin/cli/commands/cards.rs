use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run_add(
    app: &App,
    deck: &str,
    front: String,
    back: String,
    front_lang: Option<String>,
    back_lang: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let deck = app.find_deck(deck)?;
    let card = app
        .local_store()?
        .add_card(deck.id, front, back, front_lang, back_lang)
        .context("Failed to add card")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => println!("Added card {} to {}", card.id, deck.name),
    }

    Ok(())
}

pub fn run_list(app: &App, deck: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let deck = app.find_deck(deck)?;
    let cards = app
        .local_store()?
        .list_cards(deck.id)
        .context("Failed to list cards")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Plain => {
            let now = Utc::now();
            for card in &cards {
                let status = if card.needs_review(now) {
                    paint("due", Color::YELLOW, use_color)
                } else {
                    paint("learned", Color::GREEN, use_color)
                };
                println!("{:<8} {} -> {}", status, card.front_text, card.back_text);
            }
            println!("{} cards", cards.len());
        }
    }

    Ok(())
}
