//! Polymarket API clients
//!
//! Gamma serves event/market metadata, CLOB serves price history. The
//! combined [`PolymarketClient`] is the production [`MarketDataSource`]
//! behind the report pipeline.

pub mod clob;
pub mod gamma;

pub use clob::ClobClient;
pub use gamma::{event_slug, GammaClient};

use crate::config::PolymarketConfig;
use crate::error::Result;
use crate::report::MarketDataSource;
use crate::types::{PricePoint, SubMarket};
use async_trait::async_trait;

/// Combined API client
#[derive(Clone)]
pub struct PolymarketClient {
    pub gamma: GammaClient,
    pub clob: ClobClient,
    lookback_hours: u64,
}

impl PolymarketClient {
    pub fn new(config: &PolymarketConfig, lookback_hours: u64) -> Result<Self> {
        Ok(Self {
            gamma: GammaClient::new(&config.gamma_url)?,
            clob: ClobClient::new(&config.clob_url)?,
            lookback_hours,
        })
    }
}

#[async_trait]
impl MarketDataSource for PolymarketClient {
    async fn event_markets(&self, slug: &str) -> Result<Vec<SubMarket>> {
        self.gamma.get_event_markets(slug).await
    }

    async fn full_market(&self, slug: &str) -> Result<Option<SubMarket>> {
        self.gamma.get_market_by_slug(slug).await
    }

    async fn price_history(&self, token_id: &str) -> Result<Vec<PricePoint>> {
        self.clob.get_price_history(token_id, self.lookback_hours).await
    }
}
