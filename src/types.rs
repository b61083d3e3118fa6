//! Core domain types shared across the bot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (outcome name, token id) pair of a sub-market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeToken {
    /// Outcome name, e.g. "Yes" / "No"
    pub outcome: String,
    /// CLOB token id used to query price history
    pub token_id: String,
}

/// A single sub-market of an event, normalized from the Gamma API.
///
/// The upstream record delivers outcome/token pairs in two shapes (an
/// explicit token list, or two parallel stringified lists); by the time a
/// `SubMarket` exists those have been folded into one ordered `outcomes`
/// list, explicit entries first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubMarket {
    /// Full market question
    pub question: String,
    /// Short per-market title within the event grouping, if any
    pub group_item_title: Option<String>,
    /// Market slug, used for the full-detail fallback fetch
    pub slug: Option<String>,
    /// Explicit closed flag
    pub closed: bool,
    /// Explicit resolved flag
    pub resolved: bool,
    /// Free-form status string ("open", "closed", "resolved", ...)
    pub status: Option<String>,
    /// Normalized ordered outcome/token pairs
    pub outcomes: Vec<OutcomeToken>,
}

impl SubMarket {
    /// Title used for display: the group item title when present,
    /// otherwise the question.
    pub fn display_title(&self) -> &str {
        match self.group_item_title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => {
                if self.question.is_empty() {
                    "Unknown"
                } else {
                    &self.question
                }
            }
        }
    }

    /// Whether the market is closed, resolved or finalized, via flags or a
    /// case-insensitive status match.
    pub fn is_closed(&self) -> bool {
        if self.closed || self.resolved {
            return true;
        }
        match self.status.as_deref() {
            Some(s) => {
                let s = s.trim().to_ascii_lowercase();
                matches!(s.as_str(), "closed" | "resolved" | "finalized")
            }
            None => false,
        }
    }

    /// Token id of the first outcome named "yes" or "true" (case-insensitive)
    pub fn yes_token_id(&self) -> Option<&str> {
        self.outcomes
            .iter()
            .find(|o| {
                let name = o.outcome.trim().to_ascii_lowercase();
                name == "yes" || name == "true"
            })
            .map(|o| o.token_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// One point of a price history series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Timestamp of the observation
    pub t: DateTime<Utc>,
    /// Implied probability in [0, 1]
    pub p: f64,
}
