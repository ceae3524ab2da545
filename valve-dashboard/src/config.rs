//! Configuration module

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URI of the prediction service, e.g. `http://127.0.0.1:8000`
    pub api_uri: String,

    /// Directory holding FS1.txt, PS2.txt and profile.txt
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables. `API_URI` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_uri: env::var("API_URI").map_err(|_| ConfigError::MissingVar("API_URI"))?,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        })
    }
}
