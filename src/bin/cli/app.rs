use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use flashvox_lib::config::{Backend, ClientConfig};
use flashvox_lib::study::{CardRepository, Deck, HttpCardRepository, LocalCardRepository, SessionController};
use flashvox_lib::voice::{CommandSpeech, LanguageDetector, Narrator, SilentSpeech, SpeechOutput};

/// Shared application state for CLI commands
pub struct App {
    pub config: ClientConfig,
    /// Present for the local backend; deck management needs it
    pub local: Option<Arc<LocalCardRepository>>,
    pub repository: Arc<dyn CardRepository>,
}

impl App {
    pub fn new(config_path: Option<&Path>, mute: bool) -> Result<Self> {
        let mut config = ClientConfig::load(config_path).context("Failed to load config")?;
        config.mute |= mute;

        let (local, repository) = match config.backend {
            Backend::Local => {
                let data_dir = config
                    .resolved_data_dir()
                    .context("Failed to get data directory")?;
                let local = Arc::new(LocalCardRepository::new(data_dir));
                local.init().context("Failed to initialize card storage")?;
                (Some(local.clone()), local as Arc<dyn CardRepository>)
            }
            Backend::Http => {
                let base_url = config
                    .base_url
                    .as_deref()
                    .context("base_url must be set for the http backend")?;
                let remote = HttpCardRepository::new(base_url, config.api_token.clone(), config.request_timeout())
                    .context("Failed to create HTTP client")?;
                (None, Arc::new(remote) as Arc<dyn CardRepository>)
            }
        };

        Ok(Self {
            config,
            local,
            repository,
        })
    }

    /// The local store, or an error for remote backends
    pub fn local_store(&self) -> Result<&LocalCardRepository> {
        match &self.local {
            Some(local) => Ok(local.as_ref()),
            None => bail!("Deck management is only available with the local backend"),
        }
    }

    pub fn speech(&self) -> Arc<dyn SpeechOutput> {
        if self.config.mute {
            Arc::new(SilentSpeech::default())
        } else {
            Arc::new(CommandSpeech::new(self.config.speech_command.clone()))
        }
    }

    pub fn narrator(&self) -> Narrator {
        Narrator::new(
            self.speech(),
            LanguageDetector::new(self.config.fallback_language.clone()),
        )
    }

    pub fn controller(&self) -> SessionController {
        SessionController::new(self.repository.clone(), self.narrator())
            .with_options(self.config.study)
            .with_settings_timeout(self.config.settings_timeout())
    }

    /// Find a deck by id, exact name, or unique name prefix
    pub fn find_deck(&self, key: &str) -> Result<Deck> {
        let store = self.local_store()?;
        if let Ok(deck) = store.resolve_deck(key) {
            return Ok(deck);
        }

        let decks = store.list_decks().context("Failed to list decks")?;
        let key_lower = key.to_lowercase();
        let matches: Vec<&Deck> = decks
            .iter()
            .filter(|d| d.name.to_lowercase().starts_with(&key_lower))
            .collect();

        match matches.len() {
            0 => bail!(
                "No deck matching '{}'. Available decks:\n{}",
                key,
                decks.iter().map(|d| format!("  - {}", d.name)).collect::<Vec<_>>().join("\n")
            ),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous deck name '{}'. Matches:\n{}",
                key,
                matches.iter().map(|d| format!("  - {}", d.name)).collect::<Vec<_>>().join("\n")
            ),
        }
    }

    /// Deck id from a name (local backend) or a raw UUID (any backend)
    pub fn deck_id(&self, key: &str) -> Result<uuid::Uuid> {
        if self.local.is_some() {
            return Ok(self.find_deck(key)?.id);
        }
        uuid::Uuid::parse_str(key).with_context(|| format!("'{}' is not a deck id", key))
    }
}
