//! "Yes" outcome price resolution
//!
//! For each selected sub-market: find the "yes" token (one-shot full-detail
//! re-fetch when the event summary lacks it), then pull its recent history.
//! Resolution never fails — missing data degrades to an empty result and the
//! report renders a sentinel for the affected item only.

use crate::report::MarketDataSource;
use crate::types::{PricePoint, SubMarket};
use tracing::{debug, warn};

/// Outcome of resolving one sub-market's price data.
///
/// Shapes: `(None, empty)` when no token resolved, `(Some, empty)` when the
/// token has no history, `(Some, series)` otherwise.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPrice {
    pub token_id: Option<String>,
    pub history: Vec<PricePoint>,
}

impl ResolvedPrice {
    /// Last observed probability, if any history exists
    pub fn current(&self) -> Option<f64> {
        self.history.last().map(|pt| pt.p)
    }
}

/// Resolves "yes" tokens and their price history via the data source
pub struct PriceResolver<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: MarketDataSource + ?Sized> PriceResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub async fn resolve_yes(&self, market: &SubMarket) -> ResolvedPrice {
        let token_id = match market.yes_token_id() {
            Some(id) => Some(id.to_string()),
            None => self.fallback_token(market).await,
        };

        let Some(token_id) = token_id else {
            debug!("No yes token for '{}'", market.display_title());
            return ResolvedPrice::default();
        };

        let history = match self.source.price_history(&token_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(
                    "Price history fetch failed for '{}': {}",
                    market.display_title(),
                    e
                );
                Vec::new()
            }
        };

        ResolvedPrice {
            token_id: Some(token_id),
            history,
        }
    }

    /// The event summary sometimes omits token data; re-fetch the full
    /// market record by slug and retry once. No further fallback.
    async fn fallback_token(&self, market: &SubMarket) -> Option<String> {
        let slug = market.slug.as_deref()?;
        debug!("Summary lacks yes token, fetching full market: {}", slug);

        match self.source.full_market(slug).await {
            Ok(Some(full)) => full.yes_token_id().map(str::to_string),
            Ok(None) => None,
            Err(e) => {
                warn!("Full market fetch failed for {}: {}", slug, e);
                None
            }
        }
    }
}
