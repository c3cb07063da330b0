use anyhow::{bail, Result};

use flashvox_lib::voice::{GenderPreference, ScoredVoice};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    language: Option<&str>,
    gender: Option<GenderPreference>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let narrator = app.narrator();
    let catalog = narrator.catalog();
    if catalog.is_empty() {
        bail!("No voices available from '{}'", app.config.speech_command);
    }

    let voices: Vec<&ScoredVoice> = match language {
        Some(language) => catalog.ranked(language),
        None => catalog.voices().iter().collect(),
    };
    let chosen = language.and_then(|language| catalog.best_voice(language, gender));

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "voices": voices,
                "chosen": chosen,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for voice in &voices {
                let local = if voice.voice.is_local_service { "local" } else { "network" };
                println!(
                    "{:>4}  {:<8} {:<8} {:<7} {}",
                    voice.quality_score,
                    voice.voice.lang,
                    voice.gender.to_string(),
                    local,
                    voice.voice.name
                );
            }
            if let Some(chosen) = chosen {
                println!(
                    "{} {} ({})",
                    paint("chosen:", Color::BOLD, use_color),
                    chosen.voice.name,
                    chosen.voice.lang
                );
            }
        }
    }

    Ok(())
}
