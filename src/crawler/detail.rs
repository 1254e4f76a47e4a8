//! Detail worker
//!
//! Fetches one listing's detail page and extracts its fields. A detail page
//! that cannot be fetched never fails the run; it only leaves the listing
//! without a price.

use crate::crawler::Fetcher;
use crate::extract::{extract_detail_page, MarkupProfile};
use crate::model::ListingDetail;
use crate::FetchResult;
use url::Url;

/// Fetches and extracts a detail page, surfacing fetch failures
pub async fn fetch_detail(
    fetcher: &dyn Fetcher,
    profile: &MarkupProfile,
    url: &Url,
) -> FetchResult<ListingDetail> {
    let html = fetcher.fetch(url).await?;
    let detail = extract_detail_page(&html, profile);

    tracing::debug!(
        url = %url,
        price = ?detail.price,
        attributes = detail.attributes.len(),
        "Scraped detail page"
    );

    Ok(detail)
}

/// A detail page scrape that has already absorbed any fetch failure
#[derive(Debug, Clone, PartialEq)]
pub struct DetailOutcome {
    pub detail: ListingDetail,

    /// The page could not be fetched and `detail` is the empty default
    pub failed: bool,
}

/// Scrapes a detail page and reports whether the fetch failed
///
/// A fetch failure is logged and yields `ListingDetail::default()`.
pub async fn scrape_detail_outcome(
    fetcher: &dyn Fetcher,
    profile: &MarkupProfile,
    url: &Url,
) -> DetailOutcome {
    match fetch_detail(fetcher, profile, url).await {
        Ok(detail) => DetailOutcome {
            detail,
            failed: false,
        },
        Err(e) => {
            tracing::warn!(url = %url, "Detail page failed, keeping empty detail: {}", e);
            DetailOutcome {
                detail: ListingDetail::default(),
                failed: true,
            }
        }
    }
}

/// Fetches and extracts a detail page, never failing
pub async fn scrape_detail(fetcher: &dyn Fetcher, profile: &MarkupProfile, url: &Url) -> ListingDetail {
    scrape_detail_outcome(fetcher, profile, url).await.detail
}
