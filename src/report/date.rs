//! Date extraction from sub-market titles
//!
//! Event groupings often name their sub-markets by date threshold
//! ("January 31", "March 1"). Titles that carry no date ("Yes", "No",
//! arbitrary text) are a normal case and simply yield `None`.

use chrono::{Datelike, NaiveDate, Utc};

/// Parse a "Month Day" title into a date in the given year.
/// Any parse failure (wrong format, invalid day) yields `None`.
pub fn parse_market_date_in(title: &str, year: i32) -> Option<NaiveDate> {
    let full = format!("{} {}", title.trim(), year);
    NaiveDate::parse_from_str(&full, "%B %d %Y").ok()
}

/// Parse a "Month Day" title assuming the current year
pub fn parse_market_date(title: &str) -> Option<NaiveDate> {
    parse_market_date_in(title, Utc::now().year())
}
