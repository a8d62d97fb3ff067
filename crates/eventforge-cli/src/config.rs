use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventforge_core::GenerationPolicy;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "eventforge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Contents of `eventforge.toml`. Missing tables and keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub policy: GenerationPolicy,
    pub output: OutputConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_dir: PathBuf,
    /// Optional single-file SQL script.
    pub sql_script: Option<PathBuf>,
    pub force: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("out"),
            sql_script: None,
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub enabled: bool,
    pub database_url: Option<String>,
    pub connect_attempts: u32,
    pub connect_delay_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_url: None,
            connect_attempts: 5,
            connect_delay_secs: 5,
        }
    }
}

/// Load an explicit config file, else `eventforge.toml` if present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(Config::default());
            }
            fallback
        }
    };

    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    parse_config(&text).map_err(|source| ConfigError::Parse { path, source })
}

pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}
