mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use flashvox_lib::voice::GenderPreference;

#[derive(Parser)]
#[command(name = "flashvox-cli", about = "Flashcard study sessions with narration", version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Never speak
    #[arg(long, global = true)]
    mute: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List decks
    Decks,

    /// Deck management
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Card management
    #[command(subcommand)]
    Card(CardCommand),

    /// Show which cards a session would study
    Select {
        /// Deck name (case-insensitive prefix match) or id
        deck: String,
    },

    /// Study a deck interactively
    Study {
        /// Deck name (case-insensitive prefix match) or id
        deck: String,
        /// Filter due cards locally instead of asking for a ranked list
        #[arg(long)]
        legacy: bool,
        /// Shuffle locally selected cards
        #[arg(long)]
        mixed: bool,
    },

    /// List available voices, best first
    Voices {
        /// Only voices for this language tag
        language: Option<String>,
        /// Show the voice chosen for this gender preference
        #[arg(long)]
        gender: Option<GenderPreference>,
    },

    /// Detect the language of a text
    Detect {
        text: String,
    },
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a new deck
    New {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card to a deck
    Add {
        /// Deck name (case-insensitive prefix match) or id
        deck: String,
        front: String,
        back: String,
        /// Language tag of the front, e.g. fr-FR
        #[arg(long)]
        front_lang: Option<String>,
        /// Language tag of the back
        #[arg(long)]
        back_lang: Option<String>,
    },

    /// List the cards of a deck
    List {
        deck: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.config.as_deref(), cli.mute)?;

    match cli.command {
        Command::Decks => {
            commands::decks::run(&app, &cli.format, use_color)?;
        }
        Command::Deck(DeckCommand::New { name, description }) => {
            commands::decks::run_new(&app, name, description, &cli.format)?;
        }
        Command::Card(CardCommand::Add {
            deck,
            front,
            back,
            front_lang,
            back_lang,
        }) => {
            commands::cards::run_add(&app, &deck, front, back, front_lang, back_lang, &cli.format)?;
        }
        Command::Card(CardCommand::List { deck }) => {
            commands::cards::run_list(&app, &deck, &cli.format, use_color)?;
        }
        Command::Select { deck } => {
            commands::select::run(&app, &deck, &cli.format, use_color).await?;
        }
        Command::Study { deck, legacy, mixed } => {
            commands::study::run(&app, &deck, legacy, mixed, use_color).await?;
        }
        Command::Voices { language, gender } => {
            commands::voices::run(&app, language.as_deref(), gender, &cli.format, use_color)?;
        }
        Command::Detect { text } => {
            commands::detect::run(&app, &text, &cli.format)?;
        }
    }

    Ok(())
}
