//! Display configuration
//!
//! Settings are read from TOML. Every key is optional:
//!
//! ```toml
//! carousel_interval_ms = 30000
//! timeout_ms = 300000
//! splash = "Hold on, I'm\nstill waking up"
//! ```

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Default carousel rotation period
pub const DEFAULT_CAROUSEL_INTERVAL_MS: u64 = 30_000;

/// Default inactivity timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Default cold-start splash
pub const DEFAULT_SPLASH: &str = "Hold on, I'm\nstill waking up";

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// The document is not valid TOML for this schema
    TomlParse(toml::de::Error),
    /// A value is out of range
    InvalidValue(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TomlParse(e) => write!(f, "invalid config: {}", e),
            ConfigError::InvalidValue(key) => write!(f, "invalid value for '{}'", key),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::TomlParse(e) => Some(e),
            ConfigError::InvalidValue(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::TomlParse(e)
    }
}

/// LCD service configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LcdConfig {
    /// Carousel rotation period in milliseconds
    pub carousel_interval_ms: u64,
    /// Inactivity timeout in milliseconds
    pub timeout_ms: u64,
    /// Text shown at cold start, lines separated by `\n`
    pub splash: String,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            carousel_interval_ms: DEFAULT_CAROUSEL_INTERVAL_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            splash: DEFAULT_SPLASH.to_string(),
        }
    }
}

impl LcdConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: LcdConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.carousel_interval_ms == 0 {
            return Err(ConfigError::InvalidValue("carousel_interval_ms"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("timeout_ms"));
        }
        Ok(())
    }

    /// Carousel rotation period
    pub fn carousel_interval(&self) -> Duration {
        Duration::from_millis(self.carousel_interval_ms)
    }

    /// Inactivity timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
