//! Price statistics over scraped items
//!
//! This module provides the aggregation that turns scraped items into a
//! `ScrapeRun`, plus the helpers a presentation layer needs to recompute
//! the same statistics over a filtered view.

use crate::model::{ScrapeRun, ScrapedItem};
use indexmap::IndexSet;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;
use url::Url;

/// Minimum, rounded mean and maximum of a set of prices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceStats {
    pub min: Decimal,
    pub avg: Decimal,
    pub max: Decimal,
    pub count: usize,
}

impl PriceStats {
    /// Computes statistics over `prices`; `None` when there are none
    ///
    /// The mean is rounded to an integer, halves away from zero.
    ///
    /// # Example
    ///
    /// ```
    /// use adsweep::output::PriceStats;
    /// use rust_decimal::Decimal;
    ///
    /// let prices = [Decimal::from(10), Decimal::from(20), Decimal::from(31)];
    /// let stats = PriceStats::compute(&prices).unwrap();
    /// assert_eq!(stats.avg, Decimal::from(20));
    /// ```
    pub fn compute(prices: &[Decimal]) -> Option<Self> {
        let first = *prices.first()?;

        let (min, max) = prices
            .iter()
            .fold((first, first), |(min, max), price| (min.min(*price), max.max(*price)));

        let mean = match prices
            .iter()
            .try_fold(Decimal::ZERO, |sum, price| sum.checked_add(*price))
        {
            Some(sum) => sum.checked_div(Decimal::from(prices.len()))?,
            None => running_mean(prices),
        };

        // Rounding can push a mean of near-equal prices past either bound
        let avg = mean
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .clamp(min, max);

        Some(Self {
            min,
            avg,
            max,
            count: prices.len(),
        })
    }
}

/// Incremental mean for sums that do not fit in a `Decimal`
///
/// Each step moves the mean by `price / k - mean / k`, which stays in range
/// for any pair of decimals.
fn running_mean(prices: &[Decimal]) -> Decimal {
    prices
        .iter()
        .zip(1u64..)
        .fold(Decimal::ZERO, |mean, (price, k)| {
            let k = Decimal::from(k);
            mean + (*price / k - mean / k)
        })
}

/// Builds the run result from every scraped item
///
/// Items without a strictly positive price are dropped; statistics cover
/// the remaining ones.
pub fn aggregate(items: Vec<ScrapedItem>) -> ScrapeRun {
    let scraped = items.len();
    let items: Vec<ScrapedItem> = items
        .into_iter()
        .filter(|item| item.positive_price().is_some())
        .collect();

    if items.len() < scraped {
        tracing::debug!(
            dropped = scraped - items.len(),
            "Dropped items without a positive price"
        );
    }

    let prices: Vec<Decimal> = items.iter().filter_map(ScrapedItem::positive_price).collect();
    let stats = PriceStats::compute(&prices);

    ScrapeRun {
        min_price: stats.map(|s| s.min),
        avg_price: stats.map(|s| s.avg),
        max_price: stats.map(|s| s.max),
        total_items: items.len(),
        items,
    }
}

/// Statistics over the positive-priced items not in `excluded`
pub fn summarize_excluding(items: &[ScrapedItem], excluded: &HashSet<Url>) -> Option<PriceStats> {
    let prices: Vec<Decimal> = items
        .iter()
        .filter(|item| !excluded.contains(item.url()))
        .filter_map(ScrapedItem::positive_price)
        .collect();

    PriceStats::compute(&prices)
}

/// Union of attribute keys across items, in first-seen order
pub fn attribute_keys(items: &[ScrapedItem]) -> Vec<String> {
    let keys: IndexSet<&str> = items
        .iter()
        .flat_map(|item| item.detail.attributes.keys())
        .map(String::as_str)
        .collect();

    keys.into_iter().map(str::to_string).collect()
}
