//! Load server settings from environment variables.

use crate::config::{validate, ServerConfig};
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

impl ServerConfig {
    /// Read settings from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or blank keys keep their defaults; anything unparseable is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = ServerConfig {
            database_url: get("DATABASE_URL"),
            ..ServerConfig::default()
        };
        if let Some(v) = get("HOST") {
            config.host = parse("HOST", &v)?;
        }
        if let Some(v) = get("PORT") {
            config.port = parse("PORT", &v)?;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse("REQUEST_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("MAX_CONCURRENT_REQUESTS") {
            config.max_concurrent_requests = parse("MAX_CONCURRENT_REQUESTS", &v)?;
        }
        if let Some(v) = get("MAX_BODY_BYTES") {
            config.max_body_bytes = parse("MAX_BODY_BYTES", &v)?;
        }
        if let Some(v) = get("MAX_PER_PAGE") {
            config.max_per_page = parse("MAX_PER_PAGE", &v)?;
        }
        validate(&config)?;
        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
