//! Report assembly
//!
//! Combines the ordered selection with its resolved prices into the two
//! output halves: a chart specification (one panel per item) and a
//! monospace text table. Row order always matches selection order.

use crate::report::resolver::ResolvedPrice;
use crate::report::selector::SelectionItem;
use chrono::{DateTime, Utc};

/// Sentinel shown when an item has no observable probability
pub const NA_SENTINEL: &str = "N/A";

/// One text-table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub label: String,
    /// "NN.N%" or the "N/A" sentinel
    pub probability: String,
}

/// One chart panel: either a percentage series or a placeholder marker
#[derive(Debug, Clone)]
pub struct ChartPanel {
    pub title: String,
    /// (timestamp, probability scaled to 0-100), time-ordered
    pub series: Vec<(DateTime<Utc>, f64)>,
    /// Set when there is nothing to plot ("No History" / "Data Unavailable")
    pub placeholder: Option<&'static str>,
}

/// Chart-ready panel set handed to the renderer
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub panels: Vec<ChartPanel>,
}

/// Build the chart spec and text table. `items` and `resolved` are parallel,
/// one entry per selected sub-market.
pub fn assemble(
    title: &str,
    items: &[SelectionItem],
    resolved: &[ResolvedPrice],
) -> (ChartSpec, String) {
    let mut panels = Vec::with_capacity(items.len());
    let mut rows = Vec::with_capacity(items.len());

    for (item, prices) in items.iter().zip(resolved) {
        let label = item_label(item);

        let probability = match prices.current() {
            Some(p) => format!("{:.1}%", p * 100.0),
            None => NA_SENTINEL.to_string(),
        };
        rows.push(ReportRow {
            label: label.clone(),
            probability,
        });

        let placeholder = if prices.token_id.is_none() {
            Some("Data Unavailable")
        } else if prices.history.is_empty() {
            Some("No History")
        } else {
            None
        };
        panels.push(ChartPanel {
            title: label,
            series: prices
                .history
                .iter()
                .map(|pt| (pt.t, pt.p * 100.0))
                .collect(),
            placeholder,
        });
    }

    let spec = ChartSpec {
        title: title.to_string(),
        panels,
    };
    (spec, render_table(&rows))
}

/// Display label: optional target prefix, title, optional parsed date
fn item_label(item: &SelectionItem) -> String {
    let mut label = match item.target {
        Some(target) => format!("{}: {}", target, item.title),
        None => item.title.clone(),
    };
    if let Some(date) = item.date {
        label.push_str(&format!(" ({})", date.format("%Y-%m-%d")));
    }
    label
}

/// Fixed-column table wrapped in a code fence for monospace display
fn render_table(rows: &[ReportRow]) -> String {
    let header = format!("{:<24} | {:<6}", "Market", "Prob");
    let divider = "-".repeat(header.len());

    let mut text = format!("```\n{}\n{}\n", header, divider);
    for row in rows {
        text.push_str(&format!("{:<24} | {}\n", row.label, row.probability));
    }
    text.push_str("```");
    text
}
