//! Report generation pipeline
//!
//! Turns an event reference into a chart image plus a text table:
//! select sub-markets → resolve each one's "yes" price history → assemble
//! panels and table rows → render. Selection preconditions that fail
//! (nothing fetched, nothing open, nothing parseable) produce an
//! explanatory message instead of an image; per-item data gaps degrade to
//! "N/A" rows without aborting the batch.

pub mod assembler;
pub mod chart;
pub mod date;
pub mod resolver;
pub mod selector;

#[cfg(test)]
mod tests;

pub use assembler::{ChartPanel, ChartSpec, ReportRow};
pub use resolver::{PriceResolver, ResolvedPrice};
pub use selector::{SelectionError, SelectionItem};

use crate::client::event_slug;
use crate::config::{PolicyKind, ReportConfig};
use crate::error::Result;
use crate::types::{PricePoint, SubMarket};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

/// Boundary to the market data backend. Production uses the combined
/// Gamma/CLOB client; tests substitute a stub.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// All sub-markets of an event
    async fn event_markets(&self, slug: &str) -> Result<Vec<SubMarket>>;

    /// Full record of one market, `None` when unknown
    async fn full_market(&self, slug: &str) -> Result<Option<SubMarket>>;

    /// Price history for an outcome token, empty when unavailable
    async fn price_history(&self, token_id: &str) -> Result<Vec<PricePoint>>;
}

/// Finished report: a PNG chart and a table, or a message without an image
#[derive(Debug, Clone)]
pub struct Report {
    pub image: Option<Vec<u8>>,
    pub text: String,
}

impl Report {
    fn message(text: impl Into<String>) -> Self {
        Self {
            image: None,
            text: text.into(),
        }
    }
}

/// Orchestrates one report cycle against a data source
pub struct ReportGenerator<S> {
    source: S,
    config: ReportConfig,
}

impl<S: MarketDataSource> ReportGenerator<S> {
    pub fn new(source: S, config: ReportConfig) -> Self {
        Self { source, config }
    }

    /// Generate a report for an event reference using the configured policy
    pub async fn generate(&self, event_ref: &str) -> Result<Report> {
        self.generate_with_policy(event_ref, self.config.policy).await
    }

    /// Generate a report with an explicit policy override
    pub async fn generate_with_policy(
        &self,
        event_ref: &str,
        policy: PolicyKind,
    ) -> Result<Report> {
        let slug = match event_slug(event_ref) {
            Ok(s) => s,
            Err(_) => {
                return Ok(Report::message(
                    "Could not fetch event markets. Check the URL.",
                ))
            }
        };

        info!("Generating report for event: {}", slug);
        let markets = self.source.event_markets(&slug).await?;
        if markets.is_empty() {
            return Ok(Report::message(
                "Could not fetch event markets. Check the URL.",
            ));
        }
        debug!("Fetched {} sub-markets", markets.len());

        let today = Utc::now().date_naive();
        let items = match policy {
            PolicyKind::SoonestFirst => {
                selector::select_soonest_first(markets, today, self.config.max_markets)
            }
            PolicyKind::TargetDates => selector::select_target_dates(markets, today),
        };
        let items = match items {
            Ok(items) => items,
            Err(e) => return Ok(Report::message(e.to_string())),
        };
        debug!("Selected {} markets", items.len());

        let resolver = PriceResolver::new(&self.source);
        let mut resolved = Vec::with_capacity(items.len());
        for item in &items {
            resolved.push(resolver.resolve_yes(&item.market).await);
        }

        let title = format!(
            "Polymarket Odds History (Last {}h)",
            self.config.lookback_hours
        );
        let (spec, table) = assembler::assemble(&title, &items, &resolved);
        let image = chart::render_png(&spec)?;

        Ok(Report {
            image: Some(image),
            text: table,
        })
    }
}
