//! Run coordinator - main pipeline orchestration
//!
//! This module ties the stages of one run together:
//! - Validating the seed URL
//! - Crawling the paginated results feed
//! - Scraping detail pages in scheduled batches
//! - Aggregating the items into the run result

use crate::config::{validate, Config};
use crate::crawler::detail::scrape_detail_outcome;
use crate::crawler::{BatchScheduler, Fetcher, HttpFetcher, Paginator};
use crate::extract::MarkupProfile;
use crate::model::{ListingSummary, ScrapedItem};
use crate::output::{aggregate, RunMetrics, RunReport};
use crate::url::parse_absolute;
use crate::Result;
use chrono::Utc;
use std::sync::Arc;

/// Main pipeline coordinator
///
/// Holds only configuration and collaborators; everything a run
/// accumulates lives inside [`Coordinator::run`].
pub struct Coordinator {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    profile: MarkupProfile,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Errors
    ///
    /// * `AdsweepError::Config` - a setting is out of range or a selector does not compile
    /// * `AdsweepError::Reqwest` - the HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a coordinator around any fetcher
    ///
    /// The configuration is validated here as well, so a hand-built
    /// `Config` gets the same checks as one loaded from a file.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        validate(&config)?;
        let profile = MarkupProfile::from_config(&config.markup)?;

        Ok(Self {
            config,
            fetcher,
            profile,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the full pipeline for one seed URL
    ///
    /// # Errors
    ///
    /// * `AdsweepError::SeedUrl` - the seed is not an absolute http(s) URL
    /// * `AdsweepError::Pagination` - a results page could not be fetched
    ///
    /// Detail page failures never fail the run.
    pub async fn run(&self, seed: &str) -> Result<RunReport> {
        let started_at = Utc::now();
        let seed = parse_absolute(seed)?;
        tracing::info!(seed = %seed, "Starting run");

        let paginator = Paginator::new(
            self.fetcher.as_ref(),
            &self.profile,
            self.config.crawler.page_delay(),
        );
        let context = paginator.crawl(seed).await?;
        let pages_fetched = context.pages_fetched();
        let listings = context.into_listings();
        let listings_discovered = listings.len();

        let (items, detail_failures) = self.scrape_details(listings).await;
        let scraped = items.len();

        let run = aggregate(items);
        let dropped_without_price = scraped - run.total_items;

        let metrics = RunMetrics {
            started_at,
            finished_at: Utc::now(),
            pages_fetched,
            listings_discovered,
            detail_failures,
            dropped_without_price,
        };

        tracing::info!(
            items = run.total_items,
            pages = pages_fetched,
            listings = listings_discovered,
            detail_failures,
            dropped = dropped_without_price,
            "Run completed in {}ms",
            metrics.duration().num_milliseconds()
        );

        Ok(RunReport { run, metrics })
    }

    /// Scrapes every listing's detail page in batches
    ///
    /// Returns the joined items in listing order and the number of detail
    /// pages that could not be fetched.
    async fn scrape_details(&self, listings: Vec<ListingSummary>) -> (Vec<ScrapedItem>, usize) {
        let scheduler = BatchScheduler::new(
            self.config.scheduler.concurrency,
            self.config.scheduler.batch_delay(),
        );
        tracing::info!(
            listings = listings.len(),
            batches = scheduler.chunk_sizes(listings.len()).len(),
            "Scraping detail pages"
        );

        let fetcher = self.fetcher.as_ref();
        let profile = &self.profile;

        let outcomes = scheduler
            .run(listings, |summary| async move {
                let outcome = scrape_detail_outcome(fetcher, profile, &summary.url).await;
                (ScrapedItem::new(summary, outcome.detail), outcome.failed)
            })
            .await;

        let failures = outcomes.iter().filter(|(_, failed)| *failed).count();
        let items = outcomes.into_iter().map(|(item, _)| item).collect();

        (items, failures)
    }
}

/// Runs a complete harvest for one seed URL over HTTP
///
/// This is the main entry point for a run. It will:
/// 1. Compile the markup profile and build the HTTP client
/// 2. Crawl every results page from the seed
/// 3. Scrape each listing's detail page
/// 4. Aggregate prices into the run result
pub async fn run_harvest(config: Config, seed: &str) -> Result<RunReport> {
    Coordinator::new(config)?.run(seed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AdsweepError, FetchError};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use url::Url;

    struct CannedFetcher(HashMap<String, String>);

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &Url) -> std::result::Result<String, FetchError> {
            self.0
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.crawler.page_delay_ms = 0;
        config.scheduler.batch_delay_ms = 0;
        config.scheduler.concurrency = 2;
        config
    }

    fn results_page(ids: &[u32]) -> String {
        let cards: String = ids
            .iter()
            .map(|id| format!(r#"<div class="postDetails"><a href="/ad/{id}"><h2>Ad {id}</h2></a></div>"#))
            .collect();
        format!(r#"<html><body><div id="serpMainContent">{cards}</div></body></html>"#)
    }

    fn detail_page(price: &str) -> String {
        format!(r#"<html><body><div data-id="post_price">{price}</div></body></html>"#)
    }

    fn coordinator(pages: Vec<(&str, String)>) -> Coordinator {
        let pages = pages
            .into_iter()
            .map(|(url, html)| (url.to_string(), html))
            .collect();
        Coordinator::with_fetcher(quick_config(), Arc::new(CannedFetcher(pages))).unwrap()
    }

    #[tokio::test]
    async fn test_run_joins_details_and_counts() {
        let coordinator = coordinator(vec![
            ("https://ads.example.com/search", results_page(&[1, 2, 3, 4])),
            ("https://ads.example.com/ad/1", detail_page("1,000 JOD")),
            ("https://ads.example.com/ad/2", detail_page("3,000 JOD")),
            ("https://ads.example.com/ad/3", detail_page("0")),
        ]);

        let report = coordinator.run("https://ads.example.com/search").await.unwrap();

        assert_eq!(report.run.total_items, 2);
        assert_eq!(report.run.min_price, Some(Decimal::from(1000)));
        assert_eq!(report.run.avg_price, Some(Decimal::from(2000)));
        assert_eq!(report.run.max_price, Some(Decimal::from(3000)));
        assert_eq!(report.metrics.pages_fetched, 1);
        assert_eq!(report.metrics.listings_discovered, 4);
        assert_eq!(report.metrics.detail_failures, 1);
        assert_eq!(report.metrics.dropped_without_price, 2);
    }

    #[tokio::test]
    async fn test_invalid_seed_rejected_before_fetching() {
        let coordinator = coordinator(vec![]);

        let err = coordinator.run("not a url").await.unwrap_err();
        assert!(matches!(err, AdsweepError::SeedUrl(_)));

        let err = coordinator.run("ftp://ads.example.com/search").await.unwrap_err();
        assert!(matches!(err, AdsweepError::SeedUrl(_)));
    }

    #[tokio::test]
    async fn test_seed_fetch_failure_fails_run() {
        let coordinator = coordinator(vec![]);
        let err = coordinator.run("https://ads.example.com/search").await.unwrap_err();
        assert!(matches!(err, AdsweepError::Pagination { .. }));
    }

    #[test]
    fn test_invalid_markup_config_rejected() {
        let mut config = quick_config();
        config.markup.price = "[[".to_string();

        let result = Coordinator::with_fetcher(config, Arc::new(CannedFetcher(HashMap::new())));
        assert!(matches!(result, Err(AdsweepError::Config(_))));
    }
}
