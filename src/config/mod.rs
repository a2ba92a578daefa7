//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for sensitive values like `BOT_TOKEN`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

mod logging;

pub use logging::LoggingConfig;

/// Telegram bot configuration.
///
/// The bot token is never read from the config file; it comes from the
/// `BOT_TOKEN` environment variable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(skip)]
    pub bot_token: String,
    /// Channel to broadcast new events into. Unset disables broadcasts.
    #[serde(default)]
    pub channel_id: Option<i64>,
}

/// Polymarket API endpoints and timeouts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolymarketConfig {
    /// Gamma API base URL (event discovery and snapshots).
    pub api_url: String,
    /// Event-summary endpoint for AI market commentary.
    pub context_url: String,
    pub http_timeout_secs: u64,
    pub context_timeout_secs: u64,
    /// Delay before the single retry of a context fetch.
    pub context_retry_delay_secs: u64,
    /// Responses shorter than this are treated as failed context fetches.
    pub min_context_len: usize,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            api_url: "https://gamma-api.polymarket.com".into(),
            context_url: "https://polymarket.com/api/grok/event-summary".into(),
            http_timeout_secs: 15,
            context_timeout_secs: 120,
            context_retry_delay_secs: 2,
            min_context_len: 50,
        }
    }
}

/// Scheduler intervals, thresholds, and throttling delays.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub event_check_interval_secs: u64,
    pub alert_check_interval_secs: u64,
    /// Fixed tick on which the context monitor re-evaluates per-user due times.
    pub news_tick_interval_secs: u64,
    pub default_news_interval_secs: i64,
    pub min_news_interval_secs: i64,
    /// Events with more traded volume than this are listing artifacts, not news.
    pub high_volume_threshold: f64,
    /// Events older than this many hours are listing artifacts, not news.
    pub new_event_age_hours: i64,
    pub max_seen_events: i64,
    pub max_posted_events: i64,
    /// Seen-set bootstrap size on the first-ever discovery run.
    pub bootstrap_limit: usize,
    /// How many of the newest events each discovery cycle examines.
    pub fetch_limit: usize,
    pub send_delay_ms: u64,
    pub snapshot_fetch_delay_ms: u64,
    pub context_fetch_delay_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            event_check_interval_secs: 60,
            alert_check_interval_secs: 30,
            news_tick_interval_secs: 30,
            default_news_interval_secs: 300,
            min_news_interval_secs: 180,
            high_volume_threshold: 50_000.0,
            new_event_age_hours: 48,
            max_seen_events: 10_000,
            max_posted_events: 50,
            bootstrap_limit: 100,
            fetch_limit: 20,
            send_delay_ms: 100,
            snapshot_fetch_delay_ms: 500,
            context_fetch_delay_ms: 2_000,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "polywatch.db".into(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        // Bot token only comes from the environment, never the config file.
        config.telegram.bot_token = std::env::var("BOT_TOKEN").unwrap_or_default();

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::MissingField { field: "bot_token" }.into());
        }
        if self.polymarket.api_url.is_empty() {
            return Err(ConfigError::MissingField { field: "api_url" }.into());
        }
        if self.monitor.min_news_interval_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "min_news_interval_secs",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.monitor.max_seen_events <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_seen_events",
                reason: "must be positive".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize the tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
