//! Error types for the bot

use thiserror::Error;

/// All errors the bot can produce
#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event reference: {0}")]
    InvalidEventRef(String),

    #[error("Unknown command: /{0}")]
    UnknownCommand(String),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),
}

/// Result type alias using BotError
pub type Result<T> = std::result::Result<T, BotError>;
