//! IQR-based price outlier detection
//!
//! Outliers are only flagged, never removed; the caller decides whether to
//! exclude them from a statistics view.

use crate::config::StatsConfig;
use crate::model::ScrapedItem;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashSet;
use url::Url;

/// Parameters of the IQR fence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierPolicy {
    /// How many IQRs beyond the quartiles a price may lie
    pub multiplier: f64,

    /// Below this many priced items nothing is flagged
    pub min_sample: usize,
}

impl OutlierPolicy {
    pub fn from_config(config: &StatsConfig) -> Self {
        Self {
            multiplier: config.outlier_multiplier,
            min_sample: config.outlier_min_sample,
        }
    }
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            min_sample: 4,
        }
    }
}

/// Flags price outliers with the default policy
pub fn detect_outliers(items: &[ScrapedItem]) -> HashSet<Url> {
    detect_outliers_with(items, &OutlierPolicy::default())
}

/// Flags items whose price lies outside `[Q1 - k*IQR, Q3 + k*IQR]`
///
/// Quartiles are read at indices `floor(0.25n)` and `floor(0.75n)` of the
/// sorted positive prices. Items without a positive price are ignored.
pub fn detect_outliers_with(items: &[ScrapedItem], policy: &OutlierPolicy) -> HashSet<Url> {
    let priced: Vec<(&Url, Decimal)> = items
        .iter()
        .filter_map(|item| item.positive_price().map(|price| (item.url(), price)))
        .collect();

    let n = priced.len();
    if n < policy.min_sample.max(1) {
        return HashSet::new();
    }

    let Some(multiplier) = Decimal::from_f64(policy.multiplier) else {
        tracing::warn!(multiplier = policy.multiplier, "Unusable outlier multiplier");
        return HashSet::new();
    };

    let mut prices: Vec<Decimal> = priced.iter().map(|(_, price)| *price).collect();
    prices.sort();

    let q1 = prices[n / 4];
    let q3 = prices[(3 * n) / 4];
    let iqr = q3 - q1;
    let fence = iqr.saturating_mul(multiplier);
    let lower = q1.saturating_sub(fence);
    let upper = q3.saturating_add(fence);

    tracing::debug!(%q1, %q3, %lower, %upper, "Outlier fences");

    priced
        .into_iter()
        .filter(|(_, price)| *price < lower || *price > upper)
        .map(|(url, _)| url.clone())
        .collect()
}
