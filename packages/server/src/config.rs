//! Server configuration.

use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::scheduler::timer::DEFAULT_GRACE_PERIOD;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Grace period must be greater than zero")]
    ZeroGracePeriod,

    #[error("Host must not be empty")]
    EmptyHost,
}

/// Validated runtime configuration of the lobby server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Reconnect window after a session loses its last connection
    pub grace_period: Duration,
}

impl ServerConfig {
    pub fn new(host: String, port: u16, grace_period: Duration) -> Result<Self, ConfigError> {
        if host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if grace_period.is_zero() {
            return Err(ConfigError::ZeroGracePeriod);
        }
        Ok(Self {
            host,
            port,
            grace_period,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}
