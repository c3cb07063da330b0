use anyhow::Result;

use flashvox_lib::voice::LanguageDetector;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, text: &str, format: &OutputFormat) -> Result<()> {
    let detector = LanguageDetector::new(app.config.fallback_language.clone());
    let language = detector.detect(text);

    match format {
        OutputFormat::Json => {
            let scores: serde_json::Map<String, serde_json::Value> = detector
                .scores(text)
                .into_iter()
                .map(|(tag, score)| (tag.to_string(), serde_json::json!(score)))
                .collect();
            let output = serde_json::json!({
                "language": language,
                "fallback": detector.fallback(),
                "scores": scores,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("{}", language),
    }

    Ok(())
}
