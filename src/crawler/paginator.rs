//! Pagination crawler
//!
//! Walks a search-results feed page by page, starting at the seed, and
//! collects the deduplicated listing summaries in discovery order. Pages are
//! fetched strictly one after another.

use crate::crawler::Fetcher;
use crate::extract::{extract_listing_page, MarkupProfile};
use crate::model::PageExtraction;
use crate::state::{CrawlContext, CrawlState};
use crate::{AdsweepError, Result};
use std::time::Duration;
use url::Url;

/// Follows next-page links from a seed results page
pub struct Paginator<'a> {
    fetcher: &'a dyn Fetcher,
    profile: &'a MarkupProfile,
    page_delay: Duration,
}

impl<'a> Paginator<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, profile: &'a MarkupProfile, page_delay: Duration) -> Self {
        Self {
            fetcher,
            profile,
            page_delay,
        }
    }

    /// Crawls every results page reachable from `seed`
    ///
    /// Stops when a page carries the termination marker or has no usable
    /// next-page control.
    ///
    /// # Errors
    ///
    /// `AdsweepError::Pagination` if any results page cannot be fetched; no
    /// partial listing set is returned in that case.
    pub async fn crawl(&self, seed: Url) -> Result<CrawlContext> {
        let mut context = CrawlContext::new();
        let mut state = CrawlState::Fetching(seed);

        loop {
            let from = state.phase();
            let next = match state {
                CrawlState::Fetching(url) => self.fetch_page(url, &mut context).await?,
                CrawlState::Accumulating(page) => self.accumulate(page, &mut context).await,
                CrawlState::Done => break,
            };

            if !from.can_transition_to(next.phase()) {
                return Err(AdsweepError::InvalidTransition {
                    from,
                    to: next.phase(),
                });
            }
            state = next;
        }

        tracing::info!(
            pages = context.pages_fetched(),
            listings = context.listing_count(),
            "Pagination complete"
        );

        Ok(context)
    }

    async fn fetch_page(&self, url: Url, context: &mut CrawlContext) -> Result<CrawlState> {
        tracing::info!(page = context.pages_fetched() + 1, url = %url, "Fetching results page");

        let html = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| AdsweepError::Pagination {
                url: url.to_string(),
                source,
            })?;

        context.record_page(&url);
        let page = extract_listing_page(&html, &url, self.profile);

        tracing::debug!(
            url = %url,
            listings = page.listings.len(),
            marker = page.reached_termination_marker,
            has_next = page.next_page_url.is_some(),
            "Extracted results page"
        );

        Ok(CrawlState::Accumulating(page))
    }

    async fn accumulate(&self, page: PageExtraction, context: &mut CrawlContext) -> CrawlState {
        let added = context.merge(page.listings);
        tracing::info!(
            added,
            total = context.listing_count(),
            "Merged results page"
        );

        if page.reached_termination_marker {
            tracing::info!("Termination marker reached, stopping pagination");
            return CrawlState::Done;
        }

        let Some(next) = page.next_page_url else {
            tracing::debug!("No next page");
            return CrawlState::Done;
        };

        if context.has_visited(&next) {
            tracing::warn!(url = %next, "Next page was already visited in this run");
        }

        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        CrawlState::Fetching(next)
    }
}
