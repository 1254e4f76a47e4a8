//! Listing and run data types
//!
//! These are the values produced by the extractors and handed to the
//! aggregator, plus the serialized result contract consumed by the
//! presentation layer.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

/// One listing as seen on a search-results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    /// Canonical absolute URL of the detail page; the dedup key
    pub url: Url,

    /// Listing title, possibly a truncated text excerpt
    pub title: String,

    /// Absolute thumbnail URL, empty when the card has no image
    pub thumbnail_url: String,
}

/// Attribute value read from a detail page
///
/// Multi-value fields (a comma-joined list with two or more entries) become
/// `List`; everything else stays `Scalar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttributeValue {
    /// Applies the comma-split rule to a raw field value
    ///
    /// # Examples
    ///
    /// ```
    /// use adsweep::AttributeValue;
    ///
    /// assert_eq!(
    ///     AttributeValue::from_field_text("Leather, Sunroof"),
    ///     AttributeValue::List(vec!["Leather".into(), "Sunroof".into()])
    /// );
    /// assert_eq!(
    ///     AttributeValue::from_field_text(" Leather "),
    ///     AttributeValue::Scalar("Leather".into())
    /// );
    /// ```
    pub fn from_field_text(text: &str) -> Self {
        let pieces: Vec<String> = text
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect();

        if pieces.len() > 1 {
            Self::List(pieces)
        } else {
            Self::Scalar(text.trim().to_string())
        }
    }

    /// Returns true if the value carries no text
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Renders the value as display text, joining lists with ", "
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

/// Ordered attribute map, keyed by field label
pub type Attributes = IndexMap<String, AttributeValue>;

/// Everything scraped from one detail page
///
/// `ListingDetail::default()` is the value a failed detail scrape yields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    pub price: Option<Decimal>,
    pub raw_price_text: String,
    pub description: String,
    pub attributes: Attributes,
}

/// A listing summary joined with its detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedItem {
    #[serde(flatten)]
    pub summary: ListingSummary,

    #[serde(flatten)]
    pub detail: ListingDetail,
}

impl ScrapedItem {
    pub fn new(summary: ListingSummary, detail: ListingDetail) -> Self {
        Self { summary, detail }
    }

    /// The listing identity
    pub fn url(&self) -> &Url {
        &self.summary.url
    }

    /// The price, if it is present and strictly positive
    pub fn positive_price(&self) -> Option<Decimal> {
        self.detail.price.filter(|price| *price > Decimal::ZERO)
    }
}

/// Result of extracting one search-results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub listings: Vec<ListingSummary>,
    pub reached_termination_marker: bool,
    pub next_page_url: Option<Url>,
}

/// The externally visible result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRun {
    pub items: Vec<ScrapedItem>,
    pub min_price: Option<Decimal>,
    pub avg_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub total_items: usize,
}

/// Inbound request body of the HTTP collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// Error body returned for a failed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
