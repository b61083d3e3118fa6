//! Polymarket Odds Reporting Bot
//!
//! A Telegram bot that fetches Polymarket event data on command and replies
//! with a probability chart plus a text summary table.
//!
//! ## Architecture
//!
//! ```text
//! Telegram (commands) → Report Pipeline → Telegram (photo + table)
//!                             │
//!           Selector → Resolver → Assembler → Chart Renderer
//!                             │
//!                   Gamma / CLOB API clients
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod telegram;
pub mod types;
