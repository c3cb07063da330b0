use anyhow::Result;
use chrono::Utc;

use flashvox_lib::study::{load_settings, select_cards_for_session, StudyError};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

/// Dry run of card selection: nothing is graded or persisted
pub async fn run(app: &App, deck: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let deck_id = app.deck_id(deck)?;
    let repository = app.repository.as_ref();

    let settings = load_settings(repository, app.config.settings_timeout()).await;
    let response = repository
        .get_cards(deck_id, app.config.study)
        .await
        .map_err(StudyError::Fetch)?;
    let raw_count = response.cards.len();
    let recommendations = response
        .study_session
        .as_ref()
        .and_then(|info| info.recommendations.clone())
        .unwrap_or_default();

    let now = Utc::now();
    let selection = select_cards_for_session(response, &settings, now);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "mode": selection.mode,
                "deckSize": raw_count,
                "dueCount": selection.due_count,
                "recommendations": recommendations,
                "cards": selection.cards,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} mode: {} of {} cards selected ({} due)",
                selection.mode.as_str(),
                selection.cards.len(),
                raw_count,
                selection.due_count
            );
            for (i, card) in selection.cards.iter().enumerate() {
                let marker = if card.needs_review(now) {
                    paint("*", Color::YELLOW, use_color)
                } else {
                    " ".to_string()
                };
                println!("{:>3}. {} {}", i + 1, marker, card.front_text);
            }
            for recommendation in &recommendations {
                println!("{}", paint(&format!("hint: {}", recommendation), Color::DIM, use_color));
            }
        }
    }

    Ok(())
}
