//! Top-level configuration.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::schema::{BodySection, LogFormat, LoggingConfig, ServerSection};
use crate::ConfigError;

/// Log levels accepted as the first directive of `logging.level`.
const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Heron service configuration.
///
/// Unknown fields are rejected in every section.
///
/// ```
/// use heron_config::HeronConfig;
///
/// let config = HeronConfig::default();
/// assert_eq!(config.body.max_bytes, 1024 * 1024);
/// assert_eq!(config.server.request_timeout_ms, 30_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeronConfig {
    /// Embedded server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Request body settings.
    #[serde(default)]
    pub body: BodySection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HeronConfig {
    /// Debug logging with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
            },
            ..Self::default()
        }
    }

    /// The defaults: JSON logs at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Parsed `server.http_addr`.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value("server.request_timeout_ms", "must be greater than 0"));
        }

        if self.server.max_connections == Some(0) {
            return Err(ConfigError::invalid_value("server.max_connections", "must be greater than 0"));
        }

        if self.body.max_bytes == 0 {
            return Err(ConfigError::invalid_value("body.max_bytes", "must be greater than 0"));
        }

        let level = self.logging.level.split(',').next().unwrap_or_default().trim();
        if !level.contains('=') && !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown log level: {level}"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let dev = HeronConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert_eq!(dev.logging.level, "debug");
        assert_eq!(HeronConfig::production(), HeronConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = HeronConfig::default();
        config.server.http_addr = "localhost".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { field, .. }) if field == "server.http_addr"));

        let mut config = HeronConfig::default();
        config.body.max_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = HeronConfig::default();
        config.server.max_connections = Some(0);
        assert!(config.validate().is_err());

        let mut config = HeronConfig::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_directives_accepted() {
        let mut config = HeronConfig::default();
        config.logging.level = "heron_runtime=debug,info".to_string();
        assert!(config.validate().is_ok());
        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }
}
