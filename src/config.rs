//! Configuration file loading.
//!
//! The config lives at `<config dir>/websheets/config.toml` unless a path is
//! given on the command line. Every field is optional:
//!
//! ```toml
//! rows = 20
//! cols = 8
//! log_level = "info"
//!
//! [generation]
//! model = "text-davinci-002"
//! max_output_tokens = 50
//! prompt = "Generate a short, interesting fact or piece of data for a spreadsheet cell."
//! ```

use directories::ProjectDirs;
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use websheets_core::SheetOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown log level '{0}' (expected off, error, warn, info, debug or trace)")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    pub log_level: String,
    pub generation: GenerationConfig,
}

/// Defaults for the toolbar's "generate into selection" action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        let options = SheetOptions::default();
        Config {
            rows: options.rows,
            cols: options.cols,
            log_level: "warn".to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let options = SheetOptions::default();
        GenerationConfig {
            model: options.model,
            max_output_tokens: options.max_output_tokens,
            prompt: options.prompt,
        }
    }
}

impl Config {
    /// `<config dir>/websheets/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("", "", "websheets")?;
        let mut path = proj.config_dir().to_path_buf();
        path.push("config.toml");
        Some(path)
    }

    /// Load the config at the default location; a missing file means defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            rows: self.rows,
            cols: self.cols,
            model: self.generation.model.clone(),
            prompt: self.generation.prompt.clone(),
            max_output_tokens: self.generation.max_output_tokens,
        }
    }
}
