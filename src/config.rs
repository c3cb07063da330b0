//! Client configuration
//!
//! Read from `{config_dir}/flashvox/config.toml`. A missing file means
//! defaults: the local JSON store under `{data_dir}/flashvox` and the
//! `espeak-ng` synthesizer.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::study::FetchOptions;
use crate::voice::DEFAULT_FALLBACK_LANGUAGE;

const APP_DIR: &str = "flashvox";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine the user config directory")]
    NoConfigDir,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Where cards and settings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON files under `data_dir`
    #[default]
    Local,
    /// Study server at `base_url`
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Local store location (defaults to the platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Language assumed when detection is inconclusive
    pub fallback_language: String,
    pub settings_timeout_ms: u64,
    pub request_timeout_secs: u64,
    /// espeak-compatible synthesizer
    pub speech_command: String,
    pub mute: bool,
    pub study: FetchOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            base_url: None,
            api_token: None,
            data_dir: None,
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_string(),
            settings_timeout_ms: 5000,
            request_timeout_secs: 30,
            speech_command: "espeak-ng".to_string(),
            mute: false,
            study: FetchOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`, or the default location. Missing files yield defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Local store directory
    pub fn resolved_data_dir(&self) -> ConfigResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    pub fn settings_timeout(&self) -> Duration {
        Duration::from_millis(self.settings_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::study::StudyMode;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ClientConfig::load(Some(&temp_dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.fallback_language, "en-US");
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
backend = "http"
base_url = "https://cards.example"
fallback_language = "fr-FR"

[study]
study_mode = "legacy"
mixed_order = true
"#,
        )
        .unwrap();

        let config = ClientConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backend, Backend::Http);
        assert_eq!(config.base_url.as_deref(), Some("https://cards.example"));
        assert_eq!(config.fallback_language, "fr-FR");
        assert_eq!(config.study.study_mode, StudyMode::Legacy);
        assert!(config.study.mixed_order);
        assert!(config.study.prioritize_overdue);
        assert_eq!(config.speech_command, "espeak-ng");
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let config = ClientConfig {
            data_dir: Some(temp_dir.path().join("data")),
            api_token: Some("token".to_string()),
            mute: true,
            ..ClientConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = ClientConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.resolved_data_dir().unwrap(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "backend = 42").unwrap();
        assert!(matches!(ClientConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
    }
}
