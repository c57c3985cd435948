//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::SliceKind;
use crate::gateway::HttpGatewayConfig;
use crate::notifications::{AlertConfig, DEFAULT_CAPACITY};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data gateway endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    #[serde(default = "default_crypto_url")]
    pub crypto_url: String,

    #[serde(default = "default_news_url")]
    pub news_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_weather_url() -> String {
    "http://localhost:3000/api/weather".to_string()
}

fn default_crypto_url() -> String {
    "http://localhost:3000/api/crypto".to_string()
}

fn default_news_url() -> String {
    "http://localhost:3000/api/news".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    2
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            weather_url: default_weather_url(),
            crypto_url: default_crypto_url(),
            news_url: default_news_url(),
            request_timeout_ms: default_request_timeout(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Refresh intervals per slice
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_polling_enabled")]
    pub enabled: bool,

    #[serde(default = "default_weather_interval")]
    pub weather_secs: u64,

    #[serde(default = "default_crypto_interval")]
    pub crypto_secs: u64,

    #[serde(default = "default_news_interval")]
    pub news_secs: u64,
}

fn default_polling_enabled() -> bool {
    true
}

fn default_weather_interval() -> u64 {
    300 // 5 minutes
}

fn default_crypto_interval() -> u64 {
    60
}

fn default_news_interval() -> u64 {
    600 // 10 minutes
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: default_polling_enabled(),
            weather_secs: default_weather_interval(),
            crypto_secs: default_crypto_interval(),
            news_secs: default_news_interval(),
        }
    }
}

/// Notification feed and alert thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_alerts_enabled")]
    pub alerts_enabled: bool,

    #[serde(default = "default_price_threshold")]
    pub price_change_threshold: f64,

    #[serde(default = "default_severe_keywords")]
    pub severe_keywords: Vec<String>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_alerts_enabled() -> bool {
    true
}

fn default_price_threshold() -> f64 {
    AlertConfig::default().price_change_threshold
}

fn default_severe_keywords() -> Vec<String> {
    AlertConfig::default().severe_keywords
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            alerts_enabled: default_alerts_enabled(),
            price_change_threshold: default_price_threshold(),
            severe_keywords: default_severe_keywords(),
        }
    }
}

/// Local state (favorites) persistence
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_persist_favorites")]
    pub persist_favorites: bool,

    #[serde(default = "default_favorites_path")]
    pub favorites_path: String,
}

fn default_persist_favorites() -> bool {
    true
}

fn default_favorites_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("nexus").join("favorites.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./nexus_favorites.json".to_string())
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            persist_favorites: default_persist_favorites(),
            favorites_path: default_favorites_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("nexus").join("config.toml")),
            Some(PathBuf::from("./nexus.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Gateway overrides
        if let Ok(url) = std::env::var("NEXUS_WEATHER_URL") {
            self.gateway.weather_url = url;
        }
        if let Ok(url) = std::env::var("NEXUS_CRYPTO_URL") {
            self.gateway.crypto_url = url;
        }
        if let Ok(url) = std::env::var("NEXUS_NEWS_URL") {
            self.gateway.news_url = url;
        }

        // Polling overrides
        if let Some(secs) = env_parse("NEXUS_WEATHER_POLL_SECS") {
            self.polling.weather_secs = secs;
        }
        if let Some(secs) = env_parse("NEXUS_CRYPTO_POLL_SECS") {
            self.polling.crypto_secs = secs;
        }
        if let Some(secs) = env_parse("NEXUS_NEWS_POLL_SECS") {
            self.polling.news_secs = secs;
        }

        // State overrides
        if let Ok(path) = std::env::var("NEXUS_FAVORITES_PATH") {
            self.state.favorites_path = path;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("NEXUS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("NEXUS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Refresh interval for a slice (never shorter than one second)
    pub fn poll_interval(&self, kind: SliceKind) -> Duration {
        let secs = match kind {
            SliceKind::Weather => self.polling.weather_secs,
            SliceKind::Crypto => self.polling.crypto_secs,
            SliceKind::News => self.polling.news_secs,
        };
        Duration::from_secs(secs.max(1))
    }

    /// HTTP gateway settings for a slice
    pub fn gateway_config(&self, kind: SliceKind) -> HttpGatewayConfig {
        let url = match kind {
            SliceKind::Weather => &self.gateway.weather_url,
            SliceKind::Crypto => &self.gateway.crypto_url,
            SliceKind::News => &self.gateway.news_url,
        };

        HttpGatewayConfig {
            name: kind.to_string(),
            url: url.clone(),
            request_timeout_ms: self.gateway.request_timeout_ms,
            max_attempts: self.gateway.max_attempts,
            ..Default::default()
        }
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            price_change_threshold: self.notifications.price_change_threshold,
            severe_keywords: self.notifications.severe_keywords.clone(),
        }
    }

    /// Favorites file, if persistence is enabled
    pub fn favorites_path(&self) -> Option<PathBuf> {
        self.state
            .persist_favorites
            .then(|| PathBuf::from(&self.state.favorites_path))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Nexus Configuration
#
# Environment variables override these settings:
# - NEXUS_WEATHER_URL, NEXUS_CRYPTO_URL, NEXUS_NEWS_URL
# - NEXUS_WEATHER_POLL_SECS, NEXUS_CRYPTO_POLL_SECS, NEXUS_NEWS_POLL_SECS
# - NEXUS_FAVORITES_PATH
# - NEXUS_LOG_LEVEL
# - NEXUS_LOG_FORMAT

[gateway]
# Endpoints returning JSON arrays of records
weather_url = "http://localhost:3000/api/weather"
crypto_url = "http://localhost:3000/api/crypto"
news_url = "http://localhost:3000/api/news"

# Request timeout in milliseconds
request_timeout_ms = 10000

# Attempts per fetch for transient failures
max_attempts = 2

[polling]
# Refresh slices in the background
enabled = true

# Refresh intervals (seconds)
weather_secs = 300
crypto_secs = 60
news_secs = 600

[notifications]
# Maximum entries kept; the oldest is evicted first
capacity = 50

# Raise alerts from slice data
alerts_enabled = true

# Absolute 24h change (percent) that raises a price alert
price_change_threshold = 5.0

# Weather conditions containing any of these raise a weather alert
severe_keywords = ["thunder", "storm", "blizzard", "heavy rain", "hurricane", "tornado"]

[state]
# Keep favorites across restarts
persist_favorites = true

# Favorites file location
# favorites_path = "~/.local/share/nexus/favorites.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
