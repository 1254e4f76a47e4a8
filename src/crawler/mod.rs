//! Crawler module for the scraping pipeline
//!
//! This module contains the run logic, including:
//! - HTTP fetching with retry logic
//! - Pagination over the search-results feed
//! - Batched detail-page scraping
//! - Overall run coordination

mod coordinator;
mod detail;
mod fetcher;
mod paginator;
mod scheduler;

pub use coordinator::{run_harvest, Coordinator};
pub use detail::{fetch_detail, scrape_detail, scrape_detail_outcome, DetailOutcome};
pub use fetcher::{build_http_client, is_retryable_status, Fetcher, HttpFetcher, RetryPolicy};
pub use paginator::Paginator;
pub use scheduler::BatchScheduler;
