//! Config validation: every bound must be usable.

use crate::config::ServerConfig;
use crate::error::ConfigError;

pub fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    let checks: [(&'static str, bool); 5] = [
        ("DB_MAX_CONNECTIONS", config.db_max_connections == 0),
        ("REQUEST_TIMEOUT_SECS", config.request_timeout.is_zero()),
        ("MAX_CONCURRENT_REQUESTS", config.max_concurrent_requests == 0),
        ("MAX_BODY_BYTES", config.max_body_bytes == 0),
        ("MAX_PER_PAGE", config.max_per_page == 0),
    ];
    match checks.into_iter().find(|(_, is_zero)| *is_zero) {
        Some((key, _)) => Err(ConfigError::Zero { key }),
        None => Ok(()),
    }
}
