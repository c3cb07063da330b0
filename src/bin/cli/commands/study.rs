use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use flashvox_lib::study::{CardSide, FetchOptions, Grade, SessionController, SessionPhase, StudyError, StudyMode};
use flashvox_lib::voice::SpeakOutcome;

use crate::app::App;
use crate::render::terminal::{paint, render_card, render_stats, Color};

enum Input {
    Flip,
    Grade(Grade),
    Speak,
    SpeakBack,
    Restart,
    PracticeAll,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_lowercase().as_str() {
        "f" | "flip" | "" => Input::Flip,
        "1" | "e" | "easy" => Input::Grade(Grade::Easy),
        "2" | "m" | "medium" => Input::Grade(Grade::Medium),
        "3" | "d" | "difficult" => Input::Grade(Grade::Difficult),
        "s" | "speak" => Input::Speak,
        "b" | "back" => Input::SpeakBack,
        "r" | "restart" => Input::Restart,
        "p" | "practice" => Input::PracticeAll,
        "q" | "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

fn print_phase(controller: &SessionController, use_color: bool) {
    match controller.phase() {
        SessionPhase::Active { .. } => {
            println!();
            println!("{}", render_card(&controller.snapshot(), use_color));
        }
        SessionPhase::Completed => {
            println!();
            println!("{}", paint("Session complete", Color::BOLD, use_color));
            println!("{}", render_stats(&controller.stats(), use_color));
            println!("{}", paint("[r]estart  [p]ractice all  [q]uit", Color::DIM, use_color));
        }
        SessionPhase::NoCardsAvailable => {
            println!("No cards to study in this deck.");
            println!("{}", paint("[p]ractice all  [q]uit", Color::DIM, use_color));
        }
        SessionPhase::Idle | SessionPhase::Loading => {}
    }
}

fn report_speech(outcome: SpeakOutcome) {
    match outcome {
        SpeakOutcome::Spoken { voice, language } => log::debug!("Speaking with {} ({})", voice, language),
        SpeakOutcome::NoVoice => eprintln!("No voice available"),
        SpeakOutcome::Failed(e) => eprintln!("Speech failed: {}", e),
        SpeakOutcome::Muted => {}
    }
}

fn report_error(err: &StudyError, use_color: bool) {
    eprintln!("{}", paint(&err.to_string(), Color::RED, use_color));
}

pub async fn run(app: &App, deck: &str, legacy: bool, mixed: bool, use_color: bool) -> Result<()> {
    let deck_id = app.deck_id(deck)?;
    let options = FetchOptions {
        study_mode: if legacy { StudyMode::Legacy } else { app.config.study.study_mode },
        mixed_order: mixed || app.config.study.mixed_order,
        ..app.config.study
    };

    let mut controller = app.controller().with_options(options);
    controller
        .start(deck_id)
        .await
        .with_context(|| format!("Failed to start session on {}", deck))?;
    print_phase(&controller, use_color);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        controller.narrator_mut().drain_events();

        let result = match parse_input(&line) {
            Input::Flip => controller.flip().map(|_| ()),
            Input::Grade(grade) => match controller.mark_card(grade).await {
                Ok(outcome) => {
                    if let Some(err) = outcome.persistence_error {
                        report_error(&err, use_color);
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Input::Speak => {
                let side = match controller.phase() {
                    SessionPhase::Active { visit, .. } if visit.is_flipped() => CardSide::Back,
                    _ => CardSide::Front,
                };
                controller.speak(side).map(report_speech)
            }
            Input::SpeakBack => controller.speak(CardSide::Back).map(report_speech),
            Input::Restart => controller.restart().await,
            Input::PracticeAll => controller.practice_all().await,
            Input::Quit => break,
            Input::Unknown(other) => {
                eprintln!("Unknown command '{}'", other);
                continue;
            }
        };

        match result {
            Ok(()) => print_phase(&controller, use_color),
            Err(e) => report_error(&e, use_color),
        }
    }

    if let Some(stats) = controller.exit() {
        println!("{}", render_stats(&stats, use_color));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert!(matches!(parse_input(""), Input::Flip));
        assert!(matches!(parse_input(" 1 "), Input::Grade(Grade::Easy)));
        assert!(matches!(parse_input("D"), Input::Grade(Grade::Difficult)));
        assert!(matches!(parse_input("medium"), Input::Grade(Grade::Medium)));
        assert!(matches!(parse_input("q"), Input::Quit));
        assert!(matches!(parse_input("zz"), Input::Unknown(ref s) if s == "zz"));
    }
}
