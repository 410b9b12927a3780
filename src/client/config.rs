use std::env;
use std::time::Duration;

use crate::client::consts::{
    API_URL_VAR, DEFAULT_API_URL, DEFAULT_CAPACITY, DEFAULT_WS_URL, MAX_ATTEMPTS_VAR,
    MAX_RECONNECT_ATTEMPTS, RECONNECT_BASE_MS, RECONNECT_BASE_VAR, WS_URL_VAR,
};
use crate::connection::Backoff;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    ws_url: String,
    api_url: String,
    max_reconnect_attempts: u32,
    reconnect_base: Duration,
    capacity: usize,
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_ws_url(mut self, ws_url: &str) -> Self {
        self.config.ws_url = ws_url.to_string();
        self
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.config.api_url = api_url.to_string();
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_reconnect_base(mut self, base: Duration) -> Self {
        self.config.reconnect_base = base;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_base: Duration::from_millis(RECONNECT_BASE_MS),
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Defaults overridden by the environment (and a `.env` file, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = ConfigBuilder::new();
        if let Ok(url) = env::var(WS_URL_VAR) {
            builder = builder.with_ws_url(&url);
        }
        if let Ok(url) = env::var(API_URL_VAR) {
            builder = builder.with_api_url(&url);
        }
        if let Some(attempts) = parse_var::<u32>(MAX_ATTEMPTS_VAR)? {
            builder = builder.with_max_reconnect_attempts(attempts);
        }
        if let Some(millis) = parse_var::<u64>(RECONNECT_BASE_VAR)? {
            builder = builder.with_reconnect_base(Duration::from_millis(millis));
        }
        Ok(builder.build())
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.reconnect_base, self.max_reconnect_attempts)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.ws_url(), "ws://localhost:8000/ws/chat");
        assert_eq!(config.api_url(), "http://localhost:8000");
        assert_eq!(config.backoff(), Backoff::default());
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .with_ws_url("ws://example.test/ws/chat")
            .with_max_reconnect_attempts(2)
            .with_reconnect_base(Duration::from_millis(100))
            .with_capacity(0)
            .build();
        assert_eq!(config.ws_url(), "ws://example.test/ws/chat");
        assert_eq!(config.backoff().max_attempts(), 2);
        assert_eq!(config.backoff().delay(1), Duration::from_millis(200));
        assert_eq!(config.capacity(), 1);
    }
}
