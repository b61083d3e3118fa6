//! Configuration loading
//!
//! Loads from a TOML file plus `POLYODDS_*` environment variables. The
//! `[events]` table maps Telegram command names to Polymarket event URLs,
//! replacing the need to hardcode tracked events.

use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Telegram bot settings; optional so one-shot CLI reports work without it
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    #[serde(default)]
    pub report: ReportConfig,
    /// Command name → event URL (or slug)
    #[serde(default)]
    pub events: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Long-poll timeout for getUpdates
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketConfig {
    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            gamma_url: default_gamma_url(),
            clob_url: default_clob_url(),
        }
    }
}

/// Which selection policy the report pipeline applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// All open future markets, soonest first, capped
    #[default]
    SoonestFirst,
    /// Closest market to each of: today, next week, month end
    TargetDates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Price history lookback window in hours
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u64,
    /// Maximum markets in a soonest-first report
    #[serde(default = "default_max_markets")]
    pub max_markets: usize,
    #[serde(default)]
    pub policy: PolicyKind,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            max_markets: default_max_markets(),
            policy: PolicyKind::default(),
        }
    }
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_lookback_hours() -> u64 {
    24
}

fn default_max_markets() -> usize {
    5
}

impl Config {
    /// Load configuration from a TOML file (if present) and environment
    /// variables with the `POLYODDS` prefix, e.g. `POLYODDS_TELEGRAM__BOT_TOKEN`.
    pub fn load(path: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("POLYODDS").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    /// Resolve a Telegram command name to its configured event URL.
    /// Returns `None` for unknown commands; the caller decides how to reply.
    pub fn event_url(&self, command: &str) -> Option<&str> {
        self.events.get(command).map(String::as_str)
    }
}
