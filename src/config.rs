use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Docbrief server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Model identifier passed to the summarization provider.
    pub summarizer_model: String,
    /// Optional base URL of the summarization runtime (defaults to local Ollama).
    pub summarizer_url: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Language code handed to the OCR engine for scanned PDF pages.
    pub ocr_language: String,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            summarizer_model: load_env("SUMMARIZER_MODEL")?,
            summarizer_url: load_env_optional("SUMMARIZER_URL"),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            ocr_language: load_env_optional("OCR_LANGUAGE").unwrap_or_else(|| "eng".to_string()),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        summarizer_model = %config.summarizer_model,
        summarizer_url = ?config.summarizer_url,
        server_port = ?config.server_port,
        ocr_language = %config.ocr_language,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn missing_model_is_rejected() {
        // from_env reads the process environment, so only assert the error
        // shape when the variable is genuinely absent.
        if std::env::var("SUMMARIZER_MODEL").is_err() {
            assert!(Config::from_env().is_err());
        }
    }
}
