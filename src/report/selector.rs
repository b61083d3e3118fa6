//! Market selection policies
//!
//! Two interchangeable policies decide which sub-markets a report covers:
//! soonest-first (all open future markets, dated before undated, capped) and
//! target-dates (the closest market to today, next week and month end).

use crate::report::date::parse_market_date_in;
use crate::types::SubMarket;
use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

/// A sub-market chosen for the report, with its display metadata
#[derive(Debug, Clone)]
pub struct SelectionItem {
    pub market: SubMarket,
    /// Display title (group item title or question)
    pub title: String,
    /// Date parsed from the title, if any
    pub date: Option<NaiveDate>,
    /// Target label under the target-dates policy ("Today", "Next Week", ...)
    pub target: Option<&'static str>,
}

/// A selection policy found nothing to report on. These are expected
/// outcomes surfaced as messages, not faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No open future markets found for this event.")]
    NoOpenFutureMarkets,
    #[error("Could not parse market dates for this event.")]
    NoParseableDates,
}

/// Soonest-first policy: drop closed markets and markets dated today or
/// earlier, order dated markets ascending with undated ones appended in
/// their original order, cap the result.
pub fn select_soonest_first(
    markets: Vec<SubMarket>,
    today: NaiveDate,
    cap: usize,
) -> Result<Vec<SelectionItem>, SelectionError> {
    let mut dated = Vec::new();
    let mut undated = Vec::new();

    for market in markets {
        if market.is_closed() {
            continue;
        }
        let title = market.display_title().to_string();
        match parse_market_date_in(&title, today.year()) {
            Some(date) if date <= today => continue, // strict future only
            Some(date) => dated.push(SelectionItem {
                market,
                title,
                date: Some(date),
                target: None,
            }),
            // undated markets (e.g. a bare "Yes" candidate) are always kept
            None => undated.push(SelectionItem {
                market,
                title,
                date: None,
                target: None,
            }),
        }
    }

    if dated.is_empty() && undated.is_empty() {
        return Err(SelectionError::NoOpenFutureMarkets);
    }

    // Stable sort keeps original order among equal dates
    dated.sort_by_key(|item| item.date);
    dated.extend(undated);
    dated.truncate(cap);
    Ok(dated)
}

/// Labels for the three fixed targets of the target-dates policy
const TARGET_LABELS: [&str; 3] = ["Today", "Next Week", "Month End"];

/// Target-dates policy: for each of today, today+7d and the last day of the
/// current month, pick the dated market closest to the target. Undated
/// markets are unusable here and dropped; the same market may win more than
/// one target. Ties go to the first-encountered minimum.
pub fn select_target_dates(
    markets: Vec<SubMarket>,
    today: NaiveDate,
) -> Result<Vec<SelectionItem>, SelectionError> {
    let dated: Vec<(SubMarket, String, NaiveDate)> = markets
        .into_iter()
        .filter_map(|market| {
            let title = market.display_title().to_string();
            parse_market_date_in(&title, today.year()).map(|date| (market, title, date))
        })
        .collect();

    if dated.is_empty() {
        return Err(SelectionError::NoParseableDates);
    }

    let targets = [
        today,
        today + Days::new(7),
        last_day_of_month(today),
    ];

    let mut selected = Vec::with_capacity(targets.len());
    for (target, label) in targets.iter().zip(TARGET_LABELS) {
        let (market, title, date) = dated
            .iter()
            .min_by_key(|(_, _, date)| date.signed_duration_since(*target).num_days().abs())
            .expect("dated is non-empty");
        selected.push(SelectionItem {
            market: market.clone(),
            title: title.clone(),
            date: Some(*date),
            target: Some(label),
        });
    }
    Ok(selected)
}

/// Last calendar day of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(year, month, 1).expect("valid first of month");
    first_of_next.pred_opt().expect("month has a last day")
}
