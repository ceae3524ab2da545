//! Configuration module

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {0}: '{1}'")]
    InvalidVar(&'static str, String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Model registry base URI (http(s) endpoint or a directory path)
    pub registry_uri: String,

    /// Registry credentials
    pub registry_username: String,
    pub registry_password: String,

    /// Model artifact URI, resolved against the registry base
    pub model_uri: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The registry location, credentials and model URI are all required;
    /// the service refuses to start without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            registry_uri: require("MODEL_REGISTRY_URI")?,
            registry_username: require("MODEL_REGISTRY_USERNAME")?,
            registry_password: require("MODEL_REGISTRY_PASSWORD")?,
            model_uri: require("MODEL_URI")?,
            port: match env::var("PORT") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidVar("PORT", raw))?,
                Err(_) => 8000,
            },
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
