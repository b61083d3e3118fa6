//! CLOB API client for price history
//!
//! Read-only: the bot never trades, it only charts the prices-history feed.

use crate::error::Result;
use crate::types::PricePoint;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// CLOB API client
#[derive(Clone)]
pub struct ClobClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<RawPricePoint>,
}

#[derive(Debug, Deserialize)]
struct RawPricePoint {
    /// Unix timestamp in seconds
    t: i64,
    /// Probability in [0, 1]
    p: f64,
}

impl ClobClient {
    /// Create a new CLOB client
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch price history for a token over the lookback window.
    ///
    /// The endpoint sometimes returns nothing for a windowed query, so this
    /// retries at decreasing granularity: a daily interval over the window, a
    /// 6-hour interval over the window, then the unbounded "max" range.
    /// Returns an empty series when every attempt comes back empty — missing
    /// history is an expected case, not an error.
    pub async fn get_price_history(
        &self,
        token_id: &str,
        lookback_hours: u64,
    ) -> Result<Vec<PricePoint>> {
        let end_ts = Utc::now().timestamp();
        let start_ts = end_ts - (lookback_hours as i64) * 3600;
        let url = format!("{}/prices-history", self.base_url);

        let windowed = |interval: &str| {
            vec![
                ("market".to_string(), token_id.to_string()),
                ("startTs".to_string(), start_ts.to_string()),
                ("endTs".to_string(), end_ts.to_string()),
                ("interval".to_string(), interval.to_string()),
            ]
        };
        let strategies = [
            windowed("1d"),
            windowed("6h"),
            vec![
                ("market".to_string(), token_id.to_string()),
                ("interval".to_string(), "max".to_string()),
            ],
        ];

        for params in &strategies {
            let resp = match self.http.get(&url).query(params).send().await {
                Ok(r) => r,
                Err(e) => {
                    debug!("Price history request failed for {}: {}", token_id, e);
                    continue;
                }
            };

            if !resp.status().is_success() {
                debug!("Price history for {} returned {}", token_id, resp.status());
                continue;
            }

            let body: HistoryResponse = match resp.json().await {
                Ok(b) => b,
                Err(e) => {
                    debug!("Price history decode failed for {}: {}", token_id, e);
                    continue;
                }
            };

            if !body.history.is_empty() {
                let mut points: Vec<PricePoint> = body
                    .history
                    .into_iter()
                    .filter_map(|raw| {
                        DateTime::<Utc>::from_timestamp(raw.t, 0)
                            .map(|t| PricePoint { t, p: raw.p })
                    })
                    .collect();
                points.sort_by_key(|pt| pt.t);
                return Ok(points);
            }
        }

        Ok(Vec::new())
    }
}
