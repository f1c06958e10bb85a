//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::schema::LogFormat;
use crate::{ConfigError, HeronConfig};

/// Default environment prefix.
pub const ENV_PREFIX: &str = "HERON";

/// Loads a [`HeronConfig`] in layers, later layers overriding earlier ones:
///
/// 1. defaults, or a preset
/// 2. a TOML or JSON file
/// 3. environment variables `PREFIX__SECTION__KEY`
///
/// The result is validated by [`load`](Self::load).
///
/// ```
/// use heron_config::ConfigLoader;
///
/// let toml = r#"
///     [server]
///     http_addr = "127.0.0.1:3000"
///
///     [body]
///     max_bytes = 4096
/// "#;
///
/// let config = ConfigLoader::new()
///     .with_string(toml, "toml")
///     .unwrap()
///     .with_env_vars([("HERON__BODY__DECOMPRESS", "false")])
///     .load()
///     .unwrap();
///
/// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
/// assert_eq!(config.body.max_bytes, 4096);
/// assert!(!config.body.decompress);
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HeronConfig,
    env_prefix: Option<String>,
    env_vars: Vec<(String, String)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Starts from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HeronConfig::default(),
            env_prefix: None,
            env_vars: Vec::new(),
        }
    }

    /// Starts from [`HeronConfig::development`].
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HeronConfig::development();
        self
    }

    /// Loads a file, choosing TOML or JSON by extension.
    ///
    /// Sections present in the file replace the current ones; absent
    /// sections and fields take their defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.config = parse(&content, format)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration text in `format` (`"toml"` or `"json"`).
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Reads overrides from the process environment under `prefix`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies explicit `HERON__SECTION__KEY` overrides.
    ///
    /// Applied after any process environment overrides.
    #[must_use]
    pub fn with_env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Applies overrides and validates.
    pub fn load(self) -> Result<HeronConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides without validating.
    pub fn load_unvalidated(mut self) -> Result<HeronConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let mut vars: Vec<(String, String)> = env::vars()
                .filter(|(key, _)| key.starts_with(&format!("{prefix}__")))
                .collect();
            vars.sort();
            for (key, value) in vars {
                apply_env_var(&mut self.config, &prefix, &key, &value)?;
            }
        }

        for (key, value) in std::mem::take(&mut self.env_vars) {
            apply_env_var(&mut self.config, ENV_PREFIX, &key, &value)?;
        }

        Ok(self.config)
    }
}

fn parse(content: &str, format: &str) -> Result<HeronConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn apply_env_var(config: &mut HeronConfig, prefix: &str, key: &str, value: &str) -> Result<(), ConfigError> {
    let rest = key
        .strip_prefix(prefix)
        .and_then(|k| k.strip_prefix("__"))
        .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;
    let parts: Vec<&str> = rest.split("__").collect();

    match parts.as_slice() {
        ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
        ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => config.server.shutdown_timeout_secs = parse_number(key, value)?,
        ["SERVER", "REQUEST_TIMEOUT_MS"] => config.server.request_timeout_ms = parse_number(key, value)?,
        ["SERVER", "MAX_CONNECTIONS"] => {
            config.server.max_connections = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_number(key, value)?)
            };
        }

        ["BODY", "MAX_BYTES"] => config.body.max_bytes = parse_number(key, value)?,
        ["BODY", "DECOMPRESS"] => {
            config.body.decompress = parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
        }

        ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
        ["LOGGING", "FORMAT"] => {
            config.logging.format = match value.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => return Err(ConfigError::env_parse_error(key, "expected 'json' or 'pretty'")),
            };
        }
        ["LOGGING", "INCLUDE_LOCATION"] => {
            config.logging.include_location =
                parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
        }

        _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
