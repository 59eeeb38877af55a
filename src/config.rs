use std::time::Duration;

use crate::constants::{
    DEFAULT_FORMAT, DEFAULT_KEEP_ALIVE, DEFAULT_OLLAMA_URL, DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::ClientError;

/// Connection and default-request settings for a [`crate::Taskallama`] client.
///
/// A `Config` is a plain value owned by the caller; there is no process-wide
/// configuration state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Ollama server, e.g. `http://127.0.0.1:11434`.
    pub base_url: String,

    /// Overall request timeout for non-streaming calls.
    pub timeout: Duration,

    /// Model used when a request does not name one explicitly.
    pub default_model: Option<String>,

    /// Output format forwarded to the server; `None` omits the field and
    /// leaves the format to the server.
    pub default_format: Option<String>,

    /// How long the server keeps the model loaded after a request ("5m", "1h").
    pub keep_alive: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            default_model: None,
            default_format: Some(DEFAULT_FORMAT.to_string()),
            keep_alive: DEFAULT_KEEP_ALIVE.to_string(),
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

pub fn validate_config(config: &Config) -> Result<(), ClientError> {
    if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
        return Err(ClientError::invalid_config(&format!(
            "invalid server URL (must start with http:// or https://): {}",
            config.base_url
        )));
    }
    if let Err(e) = url::Url::parse(&config.base_url) {
        return Err(ClientError::invalid_config(&format!(
            "invalid server URL format: {}",
            e
        )));
    }
    if let Err(e) = humantime::parse_duration(&config.keep_alive) {
        return Err(ClientError::invalid_config(&format!(
            "invalid keep_alive duration {:?}: {}",
            config.keep_alive, e
        )));
    }
    if config.timeout.is_zero() {
        return Err(ClientError::invalid_config("timeout must be non-zero"));
    }
    Ok(())
}
