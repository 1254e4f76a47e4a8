//! Run report and human-readable summary

use crate::model::ScrapeRun;
use crate::output::stats::{summarize_excluding, PriceStats};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, Write};
use url::Url;

/// Counters collected while a run executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetrics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Results pages fetched
    pub pages_fetched: usize,

    /// Unique listings found across all results pages
    pub listings_discovered: usize,

    /// Detail pages that could not be fetched
    pub detail_failures: usize,

    /// Listings left out of the run for lack of a positive price
    pub dropped_without_price: usize,
}

impl RunMetrics {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// The run result together with its metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run: ScrapeRun,
    pub metrics: RunMetrics,
}

/// Writes a price summary of the run to stderr
pub fn print_summary(report: &RunReport, outliers: &HashSet<Url>) {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    if let Err(e) = write_summary(&mut handle, report, outliers) {
        tracing::warn!("Failed to write summary: {}", e);
    }
}

/// Writes a human-readable price summary
///
/// Lists the flagged outliers and the statistics recomputed without them.
pub fn write_summary<W: Write>(
    out: &mut W,
    report: &RunReport,
    outliers: &HashSet<Url>,
) -> io::Result<()> {
    let run = &report.run;
    let metrics = &report.metrics;

    writeln!(out, "=== Price Summary ===")?;
    writeln!(out)?;

    writeln!(out, "Run:")?;
    writeln!(out, "  Results pages fetched: {}", metrics.pages_fetched)?;
    writeln!(out, "  Listings discovered: {}", metrics.listings_discovered)?;
    writeln!(out, "  Detail failures: {}", metrics.detail_failures)?;
    writeln!(out, "  Dropped without price: {}", metrics.dropped_without_price)?;
    writeln!(out, "  Duration: {}s", metrics.duration().num_seconds())?;
    writeln!(out)?;

    writeln!(out, "Prices ({} items):", run.total_items)?;
    write_prices(out, run.min_price, run.avg_price, run.max_price)?;
    writeln!(out)?;

    if outliers.is_empty() {
        writeln!(out, "Outliers: none")?;
        return Ok(());
    }

    writeln!(out, "Outliers ({}):", outliers.len())?;
    for item in run.items.iter().filter(|item| outliers.contains(item.url())) {
        writeln!(
            out,
            "  - {} ({})",
            item.summary.title,
            item.detail.price.map(|p| p.to_string()).unwrap_or_default()
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Prices excluding outliers:")?;
    match summarize_excluding(&run.items, outliers) {
        Some(PriceStats { min, avg, max, .. }) => write_prices(out, Some(min), Some(avg), Some(max)),
        None => write_prices(out, None, None, None),
    }
}

fn write_prices<W: Write>(
    out: &mut W,
    min: Option<Decimal>,
    avg: Option<Decimal>,
    max: Option<Decimal>,
) -> io::Result<()> {
    let show = |value: Option<Decimal>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());

    writeln!(out, "  Min: {}", show(min))?;
    writeln!(out, "  Avg: {}", show(avg))?;
    writeln!(out, "  Max: {}", show(max))
}
