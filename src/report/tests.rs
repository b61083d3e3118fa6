//! Tests for the report pipeline

use crate::config::{PolicyKind, ReportConfig};
use crate::error::Result;
use crate::report::assembler::{assemble, NA_SENTINEL};
use crate::report::resolver::{PriceResolver, ResolvedPrice};
use crate::report::selector::{
    last_day_of_month, select_soonest_first, select_target_dates, SelectionError, SelectionItem,
};
use crate::report::{MarketDataSource, ReportGenerator};
use crate::types::{OutcomeToken, PricePoint, SubMarket};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;

// ---------- fixtures ----------

fn open_market(title: &str) -> SubMarket {
    SubMarket {
        question: format!("Will it happen by {}?", title),
        group_item_title: Some(title.to_string()),
        ..Default::default()
    }
}

fn market_with_token(title: &str, token_id: &str) -> SubMarket {
    let mut market = open_market(title);
    market.outcomes = vec![
        OutcomeToken {
            outcome: "Yes".to_string(),
            token_id: token_id.to_string(),
        },
        OutcomeToken {
            outcome: "No".to_string(),
            token_id: format!("{}-no", token_id),
        },
    ];
    market
}

fn history(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint {
            t: DateTime::from_timestamp(1_700_000_000 + i as i64 * 600, 0).unwrap(),
            p,
        })
        .collect()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct StubSource {
    markets: Vec<SubMarket>,
    full: HashMap<String, SubMarket>,
    histories: HashMap<String, Vec<PricePoint>>,
}

#[async_trait]
impl MarketDataSource for StubSource {
    async fn event_markets(&self, _slug: &str) -> Result<Vec<SubMarket>> {
        Ok(self.markets.clone())
    }

    async fn full_market(&self, slug: &str) -> Result<Option<SubMarket>> {
        Ok(self.full.get(slug).cloned())
    }

    async fn price_history(&self, token_id: &str) -> Result<Vec<PricePoint>> {
        Ok(self.histories.get(token_id).cloned().unwrap_or_default())
    }
}

// ---------- soonest-first policy ----------

#[test]
fn test_soonest_first_scenario_order() {
    let markets = vec![
        open_market("February 1"),
        open_market("January 31"),
        open_market("Yes"),
    ];
    let items = select_soonest_first(markets, day(2026, 1, 15), 5).unwrap();

    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["January 31", "February 1", "Yes"]);
}

#[test]
fn test_soonest_first_caps_output() {
    let markets = vec![
        open_market("March 1"),
        open_market("March 2"),
        open_market("March 3"),
        open_market("March 4"),
        open_market("March 5"),
        open_market("March 6"),
        open_market("Yes"),
    ];
    let items = select_soonest_first(markets, day(2026, 1, 15), 5).unwrap();
    assert_eq!(items.len(), 5);
    // dated items fill the cap before any undated item
    assert!(items.iter().all(|i| i.date.is_some()));
}

#[test]
fn test_soonest_first_drops_closed() {
    let mut closed = open_market("February 1");
    closed.closed = true;
    let mut resolved = open_market("February 2");
    resolved.resolved = true;
    let mut finalized = open_market("February 3");
    finalized.status = Some("Finalized".to_string());

    let items = select_soonest_first(
        vec![closed, resolved, finalized, open_market("February 4")],
        day(2026, 1, 15),
        5,
    )
    .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "February 4");
}

#[test]
fn test_soonest_first_strict_future_only() {
    let markets = vec![
        open_market("January 10"), // past
        open_market("January 15"), // today
        open_market("January 16"), // future
    ];
    let items = select_soonest_first(markets, day(2026, 1, 15), 5).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "January 16");
}

#[test]
fn test_soonest_first_keeps_undated_in_original_order() {
    let markets = vec![
        open_market("Yes"),
        open_market("February 1"),
        open_market("No"),
    ];
    let items = select_soonest_first(markets, day(2026, 1, 15), 5).unwrap();
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["February 1", "Yes", "No"]);
}

#[test]
fn test_soonest_first_all_closed_is_empty_selection() {
    let mut a = open_market("February 1");
    a.closed = true;
    let mut b = open_market("Yes");
    b.status = Some("resolved".to_string());

    let err = select_soonest_first(vec![a, b], day(2026, 1, 15), 5).unwrap_err();
    assert_eq!(err, SelectionError::NoOpenFutureMarkets);
}

#[test]
fn test_soonest_first_all_past_is_empty_selection() {
    let err = select_soonest_first(vec![open_market("January 1")], day(2026, 1, 15), 5)
        .unwrap_err();
    assert_eq!(err, SelectionError::NoOpenFutureMarkets);
}

#[test]
fn test_soonest_first_empty_input() {
    let err = select_soonest_first(Vec::new(), day(2026, 1, 15), 5).unwrap_err();
    assert_eq!(err, SelectionError::NoOpenFutureMarkets);
}

// ---------- target-dates policy ----------

#[test]
fn test_target_dates_three_rows() {
    let markets = vec![
        open_market("January 15"),
        open_market("January 23"),
        open_market("January 31"),
    ];
    let items = select_target_dates(markets, day(2026, 1, 15)).unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].target, Some("Today"));
    assert_eq!(items[0].title, "January 15");
    assert_eq!(items[1].target, Some("Next Week"));
    assert_eq!(items[1].title, "January 23");
    assert_eq!(items[2].target, Some("Month End"));
    assert_eq!(items[2].title, "January 31");
}

#[test]
fn test_target_dates_duplicates_allowed() {
    let items = select_target_dates(vec![open_market("March 1")], day(2026, 1, 15)).unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i.title == "March 1"));
}

#[test]
fn test_target_dates_tie_goes_to_first_encountered() {
    // both are one day from the "Today" target
    let markets = vec![open_market("January 14"), open_market("January 16")];
    let items = select_target_dates(markets, day(2026, 1, 15)).unwrap();
    assert_eq!(items[0].title, "January 14");
}

#[test]
fn test_target_dates_nothing_parses() {
    let markets = vec![open_market("Yes"), open_market("No")];
    let err = select_target_dates(markets, day(2026, 1, 15)).unwrap_err();
    assert_eq!(err, SelectionError::NoParseableDates);
}

#[test]
fn test_last_day_of_month() {
    assert_eq!(last_day_of_month(day(2026, 1, 15)), day(2026, 1, 31));
    assert_eq!(last_day_of_month(day(2026, 2, 1)), day(2026, 2, 28));
    assert_eq!(last_day_of_month(day(2028, 2, 10)), day(2028, 2, 29));
    assert_eq!(last_day_of_month(day(2026, 12, 31)), day(2026, 12, 31));
}

// ---------- price resolver ----------

#[tokio::test]
async fn test_resolver_summary_token() {
    let mut source = StubSource::default();
    source
        .histories
        .insert("tok-1".to_string(), history(&[0.4, 0.6]));

    let market = market_with_token("January 31", "tok-1");
    let resolved = PriceResolver::new(&source).resolve_yes(&market).await;

    assert_eq!(resolved.token_id.as_deref(), Some("tok-1"));
    assert_eq!(resolved.history.len(), 2);
    assert_eq!(resolved.current(), Some(0.6));
}

#[tokio::test]
async fn test_resolver_fallback_to_full_market() {
    let mut summary = open_market("January 31");
    summary.slug = Some("jan-31".to_string());

    let mut source = StubSource::default();
    source
        .full
        .insert("jan-31".to_string(), market_with_token("January 31", "tok-2"));
    source
        .histories
        .insert("tok-2".to_string(), history(&[0.5]));

    let resolved = PriceResolver::new(&source).resolve_yes(&summary).await;
    assert_eq!(resolved.token_id.as_deref(), Some("tok-2"));
    assert_eq!(resolved.current(), Some(0.5));
}

#[tokio::test]
async fn test_resolver_no_token_anywhere() {
    let mut summary = open_market("January 31");
    summary.slug = Some("jan-31".to_string());

    let source = StubSource::default(); // full_market returns None
    let resolved = PriceResolver::new(&source).resolve_yes(&summary).await;

    assert!(resolved.token_id.is_none());
    assert!(resolved.history.is_empty());
    assert_eq!(resolved.current(), None);
}

#[tokio::test]
async fn test_resolver_token_without_history() {
    let source = StubSource::default();
    let market = market_with_token("January 31", "tok-3");

    let resolved = PriceResolver::new(&source).resolve_yes(&market).await;
    assert_eq!(resolved.token_id.as_deref(), Some("tok-3"));
    assert!(resolved.history.is_empty());
}

// ---------- assembler ----------

fn item(title: &str, date: Option<NaiveDate>, target: Option<&'static str>) -> SelectionItem {
    SelectionItem {
        market: open_market(title),
        title: title.to_string(),
        date,
        target,
    }
}

#[test]
fn test_assembler_formats_percentage() {
    let items = vec![item("January 31", Some(day(2026, 1, 31)), None)];
    let resolved = vec![ResolvedPrice {
        token_id: Some("tok".to_string()),
        history: history(&[0.5, 0.625]),
    }];

    let (spec, table) = assemble("Odds", &items, &resolved);
    assert_eq!(spec.panels.len(), 1);
    assert!(spec.panels[0].placeholder.is_none());
    // probabilities scaled to 0-100 for the chart
    assert_eq!(spec.panels[0].series.last().unwrap().1, 62.5);
    assert!(table.contains("January 31 (2026-01-31)"));
    assert!(table.contains("62.5%"));
}

#[test]
fn test_assembler_na_sentinel_without_token() {
    let items = vec![item("Yes", None, None)];
    let resolved = vec![ResolvedPrice::default()];

    let (spec, table) = assemble("Odds", &items, &resolved);
    assert_eq!(spec.panels[0].placeholder, Some("Data Unavailable"));
    assert!(spec.panels[0].series.is_empty());
    assert!(table.contains(NA_SENTINEL));
}

#[test]
fn test_assembler_no_history_placeholder() {
    let items = vec![item("Yes", None, None)];
    let resolved = vec![ResolvedPrice {
        token_id: Some("tok".to_string()),
        history: Vec::new(),
    }];

    let (spec, table) = assemble("Odds", &items, &resolved);
    assert_eq!(spec.panels[0].placeholder, Some("No History"));
    assert!(table.contains(NA_SENTINEL));
}

#[test]
fn test_assembler_target_label_prefix() {
    let items = vec![item("January 15", Some(day(2026, 1, 15)), Some("Today"))];
    let resolved = vec![ResolvedPrice::default()];

    let (spec, table) = assemble("Odds", &items, &resolved);
    assert_eq!(spec.panels[0].title, "Today: January 15 (2026-01-15)");
    assert!(table.contains("Today: January 15 (2026-01-15)"));
}

#[test]
fn test_assembler_row_order_matches_selection() {
    let items = vec![
        item("January 31", Some(day(2026, 1, 31)), None),
        item("February 1", Some(day(2026, 2, 1)), None),
        item("Yes", None, None),
    ];
    let resolved = vec![
        ResolvedPrice::default(),
        ResolvedPrice::default(),
        ResolvedPrice::default(),
    ];

    let (spec, table) = assemble("Odds", &items, &resolved);
    assert_eq!(spec.panels.len(), 3);

    let jan = table.find("January 31").unwrap();
    let feb = table.find("February 1").unwrap();
    let yes = table.find("Yes").unwrap();
    assert!(jan < feb && feb < yes);
}

#[test]
fn test_assembler_table_layout() {
    let (_, table) = assemble("Odds", &[], &[]);
    assert!(table.starts_with("```\n"));
    assert!(table.ends_with("```"));
    assert!(table.contains("Market"));
    assert!(table.contains("Prob"));
    assert!(table.contains("-----"));
}

// ---------- end-to-end pipeline ----------

fn generator(source: StubSource, policy: PolicyKind) -> ReportGenerator<StubSource> {
    let config = ReportConfig {
        policy,
        ..Default::default()
    };
    ReportGenerator::new(source, config)
}

#[tokio::test]
async fn test_generate_empty_upstream() {
    let report = generator(StubSource::default(), PolicyKind::SoonestFirst)
        .generate("some-event")
        .await
        .unwrap();

    assert!(report.image.is_none());
    assert_eq!(report.text, "Could not fetch event markets. Check the URL.");
}

#[tokio::test]
async fn test_generate_all_closed() {
    let mut market = market_with_token("Yes", "tok-1");
    market.closed = true;
    let source = StubSource {
        markets: vec![market],
        ..Default::default()
    };

    let report = generator(source, PolicyKind::SoonestFirst)
        .generate("some-event")
        .await
        .unwrap();

    assert!(report.image.is_none());
    assert_eq!(report.text, "No open future markets found for this event.");
}

#[tokio::test]
async fn test_generate_unparseable_under_target_dates() {
    let source = StubSource {
        markets: vec![market_with_token("Yes", "tok-1")],
        ..Default::default()
    };

    let report = generator(source, PolicyKind::TargetDates)
        .generate("some-event")
        .await
        .unwrap();

    assert!(report.image.is_none());
    assert_eq!(report.text, "Could not parse market dates for this event.");
}

#[tokio::test]
async fn test_generate_happy_path_with_undated_market() {
    let mut source = StubSource {
        markets: vec![market_with_token("Yes", "tok-1")],
        ..Default::default()
    };
    source
        .histories
        .insert("tok-1".to_string(), history(&[0.40, 0.55, 0.623]));

    let report = generator(source, PolicyKind::SoonestFirst)
        .generate("https://polymarket.com/event/some-event")
        .await
        .unwrap();

    assert!(report.image.is_some());
    assert!(!report.image.as_ref().unwrap().is_empty());
    assert!(report.text.contains("Yes"));
    assert!(report.text.contains("62.3%"));
}

#[tokio::test]
async fn test_generate_mixed_missing_data_does_not_abort() {
    let mut source = StubSource {
        markets: vec![
            market_with_token("Yes", "tok-1"),
            open_market("No"), // no token at all
        ],
        ..Default::default()
    };
    source
        .histories
        .insert("tok-1".to_string(), history(&[0.5]));

    let report = generator(source, PolicyKind::SoonestFirst)
        .generate("some-event")
        .await
        .unwrap();

    assert!(report.image.is_some());
    assert!(report.text.contains("50.0%"));
    assert!(report.text.contains(NA_SENTINEL));
}

#[tokio::test]
async fn test_generate_is_idempotent() {
    let mut source = StubSource {
        markets: vec![market_with_token("Yes", "tok-1")],
        ..Default::default()
    };
    source
        .histories
        .insert("tok-1".to_string(), history(&[0.5, 0.7]));
    let generator = generator(source, PolicyKind::SoonestFirst);

    let first = generator.generate("some-event").await.unwrap();
    let second = generator.generate("some-event").await.unwrap();
    assert_eq!(first.text, second.text);
}
