//! Gamma API client for event and market metadata
//!
//! Normalizes the loosely-shaped upstream records into [`SubMarket`] values.
//! Outcome/token pairs arrive either as an explicit `tokens` list or as two
//! parallel `outcomes` / `clobTokenIds` lists, the latter sometimes delivered
//! as JSON-encoded strings. All four shapes collapse into one ordered pair
//! list here.

use crate::error::{BotError, Result};
use crate::types::{OutcomeToken, SubMarket};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Some Cloudflare-fronted endpoints reject requests without a browser UA
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Gamma API client for market data
#[derive(Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
}

/// A list field that may be delivered as a literal JSON array or as a
/// stringified one (e.g. `"[\"Yes\", \"No\"]"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MaybeStringified<T> {
    List(Vec<T>),
    Text(String),
}

impl<T: DeserializeOwned> MaybeStringified<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::List(v) => v,
            Self::Text(s) => serde_json::from_str(&s).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    question: Option<String>,
    group_item_title: Option<String>,
    slug: Option<String>,
    closed: Option<bool>,
    is_resolved: Option<bool>,
    status: Option<String>,
    tokens: Option<Vec<GammaToken>>,
    outcomes: Option<MaybeStringified<String>>,
    clob_token_ids: Option<MaybeStringified<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaToken {
    outcome: Option<String>,
    token_id: Option<String>,
}

/// Response structure for the event-by-slug endpoint
#[derive(Debug, Deserialize)]
struct EventResponse {
    markets: Option<Vec<GammaMarket>>,
}

impl GammaClient {
    /// Create a new Gamma client
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get all sub-markets of an event by its slug
    pub async fn get_event_markets(&self, slug: &str) -> Result<Vec<SubMarket>> {
        let url = format!("{}/events/slug/{}", self.base_url, slug);
        debug!("Fetching event: {}", slug);

        let resp: EventResponse = self.http.get(&url).send().await?.json().await?;

        Ok(resp
            .markets
            .unwrap_or_default()
            .into_iter()
            .map(normalize_market)
            .collect())
    }

    /// Get the full record of a single market by slug.
    /// Returns `None` when the market does not exist (non-success status).
    pub async fn get_market_by_slug(&self, slug: &str) -> Result<Option<SubMarket>> {
        let url = format!("{}/markets/slug/{}", self.base_url, slug);
        debug!("Fetching full market details: {}", slug);

        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            debug!("Market {} not found: {}", slug, resp.status());
            return Ok(None);
        }

        let gm: GammaMarket = resp.json().await?;
        Ok(Some(normalize_market(gm)))
    }
}

/// Fold the raw record's outcome/token shapes into one ordered pair list.
/// Explicit `tokens` entries come first, zipped parallel-list pairs after,
/// so a "yes" lookup prefers the explicit source.
fn normalize_market(gm: GammaMarket) -> SubMarket {
    let mut outcomes = Vec::new();

    for t in gm.tokens.unwrap_or_default() {
        if let (Some(outcome), Some(token_id)) = (t.outcome, t.token_id) {
            outcomes.push(OutcomeToken { outcome, token_id });
        }
    }

    let names = gm.outcomes.map(MaybeStringified::into_vec).unwrap_or_default();
    let ids = gm
        .clob_token_ids
        .map(MaybeStringified::into_vec)
        .unwrap_or_default();
    for (outcome, token_id) in names.into_iter().zip(ids) {
        outcomes.push(OutcomeToken { outcome, token_id });
    }

    SubMarket {
        question: gm.question.unwrap_or_default(),
        group_item_title: gm.group_item_title,
        slug: gm.slug,
        closed: gm.closed.unwrap_or(false),
        resolved: gm.is_resolved.unwrap_or(false),
        status: gm.status,
        outcomes,
    }
}

/// Extract the event slug from a caller-supplied reference: a full event URL
/// (the segment after `event`, otherwise the last path segment) or an
/// already-bare slug.
pub fn event_slug(event_ref: &str) -> Result<String> {
    let path = match Url::parse(event_ref) {
        Ok(u) => u.path().to_string(),
        // Not an absolute URL; treat the whole reference as a path
        Err(_) => event_ref.trim().to_string(),
    };

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let slug = match parts.iter().position(|p| *p == "event") {
        Some(i) => parts.get(i + 1).copied(),
        None => parts.last().copied(),
    };

    slug.map(str::to_string)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BotError::InvalidEventRef(event_ref.to_string()))
}
