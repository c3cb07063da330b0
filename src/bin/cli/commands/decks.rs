use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let decks = app.local_store()?.list_decks().context("Failed to list decks")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&decks)?);
        }
        OutputFormat::Plain => {
            if decks.is_empty() {
                println!("(no decks)");
            }
            for deck in &decks {
                println!(
                    "{} ({} cards)  {}",
                    paint(&deck.name, Color::BOLD, use_color),
                    deck.card_count,
                    paint(&deck.id.to_string(), Color::DIM, use_color)
                );
                if let Some(description) = &deck.description {
                    println!("    {}", description);
                }
            }
        }
    }

    Ok(())
}

pub fn run_new(app: &App, name: String, description: Option<String>, format: &OutputFormat) -> Result<()> {
    let deck = app
        .local_store()?
        .create_deck(name, description)
        .context("Failed to create deck")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&deck)?),
        OutputFormat::Plain => println!("Created deck {} ({})", deck.name, deck.id),
    }

    Ok(())
}
