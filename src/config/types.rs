use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Adsweep
///
/// Every section is optional; a missing section or key takes the default
/// the pipeline was tuned for.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub crawler: CrawlerConfig,
    pub scheduler: SchedulerConfig,
    pub stats: StatsConfig,
    pub markup: MarkupConfig,
}

/// HTTP identity, timeouts and retry policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Browser-like User-Agent sent with every request
    pub user_agent: String,

    /// Accept header value
    pub accept: String,

    /// Accept-Language header value
    pub accept_language: String,

    /// Overall timeout of a single attempt (seconds)
    pub timeout_secs: u64,

    /// Connect timeout of a single attempt (seconds)
    pub connect_timeout_secs: u64,

    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubles on every further retry (milliseconds)
    pub initial_backoff_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
            initial_backoff_ms: 300,
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

/// Pagination behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Pause between two results-page fetches (milliseconds)
    pub page_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self { page_delay_ms: 500 }
    }
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Detail-page batching
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SchedulerConfig {
    /// Detail pages fetched concurrently per batch
    pub concurrency: usize,

    /// Pause between two batches (milliseconds)
    pub batch_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            batch_delay_ms: 500,
        }
    }
}

impl SchedulerConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// Outlier detection tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StatsConfig {
    /// IQR multiplier for the outlier fences
    pub outlier_multiplier: f64,

    /// Smallest priced sample on which outliers are computed
    pub outlier_min_sample: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            outlier_multiplier: 2.0,
            outlier_min_sample: 4,
        }
    }
}

/// Selectors and markers describing the target site's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MarkupConfig {
    /// Id of the search results container
    pub results_container_id: String,

    /// Substring of the container id used when the exact id is missing
    pub results_container_token: String,

    /// Text after which a results page lists unrelated recommendations
    pub termination_marker: String,

    /// One result card
    pub item: String,

    /// Card wrapper holding the image gallery
    pub post_container: String,

    /// Title candidates inside a card
    pub title: String,

    /// Gallery image inside a card wrapper
    pub gallery_image: String,

    /// Pagination block
    pub pagination: String,

    /// Next-page control inside the pagination block
    pub next_page: String,

    /// Raw price text on a detail page
    pub price: String,

    /// Description on a detail page
    pub description: String,

    /// Attribute fields on a detail page
    pub field: String,

    /// Label inside an attribute field
    pub field_label: String,

    /// Value of a regular key/value field
    pub field_value: String,

    /// Class marking a full-row field
    pub full_row_class: String,

    /// Wide value element of a full-row field
    pub wide_value: String,

    /// Full-row list items scanned by the second pass
    pub full_row_item: String,

    /// Labels never taken from the second pass
    pub excluded_full_row_labels: Vec<String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            results_container_id: "serpMainContent".to_string(),
            results_container_token: "serp".to_string(),
            termination_marker: "Recommended Ads".to_string(),
            item: ".postDetails".to_string(),
            post_container: ".postListItem".to_string(),
            title: "h1, h2, h3, h4, [class*=\"title\"], [class*=\"Title\"]".to_string(),
            gallery_image: ".imageGallery img".to_string(),
            pagination: "#pagination".to_string(),
            next_page: "[data-id=\"nextPageArrow\"]".to_string(),
            price: "[data-id=\"post_price\"]".to_string(),
            description: "[data-id=\"description\"]".to_string(),
            field: "li[data-id^=\"singeInfoField\"]".to_string(),
            field_label: "p".to_string(),
            field_value: "a.font-bold, span.font-bold, b".to_string(),
            full_row_class: "fullRow".to_string(),
            wide_value: ".fullValue".to_string(),
            full_row_item: "li.fullRow".to_string(),
            excluded_full_row_labels: vec!["VIN Number".to_string()],
        }
    }
}
