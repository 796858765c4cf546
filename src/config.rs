// src/config.rs
//! Engine configuration
//!
//! Loaded from, in order of preference:
//! - an explicit TOML file
//! - ~/.config/bayes-authorship/config.toml
//! - built-in defaults
//!
//! The binary layers command line flags and `BAYES_*` environment variables on top.

use crate::learning::DEFAULT_BATCH_SIZE;
use crate::tokenizer::MecabTokenizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "bayes-authorship";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snapshot file of the vocabulary store
    pub store_path: PathBuf,
    pub tokenizer: TokenizerConfig,
    pub learning: LearningConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// MeCab executable (default: `mecab` from PATH)
    pub program: PathBuf,
    /// Optional MeCab user dictionary
    pub user_dictionary: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Messages learned per author per `learn` call
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_path: Self::default_store_path(),
            tokenizer: TokenizerConfig::default(),
            learning: LearningConfig::default(),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("mecab"),
            user_dictionary: None,
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl EngineConfig {
    /// Loads `path` if given, else the user config file if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::user_config_path().filter(|p| p.exists()),
        };
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!("Loaded config from {}", path.display());
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.learning.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "learning.batch_size must be at least 1".to_string(),
            ));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store_path must not be empty".to_string()));
        }
        Ok(())
    }

    /// ~/.config/bayes-authorship/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// ~/.local/share/bayes-authorship/store.bin, or ./store.bin without a home
    pub fn default_store_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|p| p.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("store.bin")
    }

    pub fn tokenizer(&self) -> MecabTokenizer {
        let tokenizer = MecabTokenizer::new(&self.tokenizer.program);
        match &self.tokenizer.user_dictionary {
            Some(dictionary) => tokenizer.with_user_dictionary(dictionary),
            None => tokenizer,
        }
    }
}
