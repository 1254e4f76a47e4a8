use crate::model::ListingSummary;
use std::collections::HashSet;
use url::Url;

/// Everything a pagination crawl accumulates
///
/// Owned by a single run and dropped with it.
#[derive(Debug, Default)]
pub struct CrawlContext {
    seen: HashSet<Url>,
    listings: Vec<ListingSummary>,
    visited_pages: HashSet<Url>,
    pages_fetched: usize,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fetched results page
    ///
    /// Returns false if the page had already been visited in this run.
    pub fn record_page(&mut self, url: &Url) -> bool {
        self.pages_fetched += 1;
        self.visited_pages.insert(url.clone())
    }

    pub fn has_visited(&self, url: &Url) -> bool {
        self.visited_pages.contains(url)
    }

    /// Appends the listings whose identity has not been seen yet
    ///
    /// Returns the number of listings added.
    pub fn merge(&mut self, listings: Vec<ListingSummary>) -> usize {
        let before = self.listings.len();
        for listing in listings {
            if self.seen.insert(listing.url.clone()) {
                self.listings.push(listing);
            } else {
                tracing::debug!(url = %listing.url, "Skipping duplicate listing");
            }
        }
        self.listings.len() - before
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    /// Consumes the context, yielding listings in discovery order
    pub fn into_listings(self) -> Vec<ListingSummary> {
        self.listings
    }
}
