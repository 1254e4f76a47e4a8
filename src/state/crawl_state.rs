//! Pagination state machine
//!
//! One results page moves the crawl from `Fetching` to `Accumulating`; from
//! there it either fetches the next page or stops.

use crate::model::PageExtraction;
use std::fmt;
use url::Url;

/// The phase of a pagination crawl, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// A results page is being requested
    Fetching,

    /// A fetched page's listings are being merged into the context
    Accumulating,

    /// No further results page will be requested
    Done,
}

impl CrawlPhase {
    /// Returns true if the crawl cannot leave this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if `next` may directly follow this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Accumulating)
                | (Self::Accumulating, Self::Fetching)
                | (Self::Accumulating, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Accumulating => "accumulating",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pagination state with the data each phase carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    /// Fetching the given results page
    Fetching(Url),

    /// Merging the extraction of the page just fetched
    Accumulating(PageExtraction),

    /// Finished
    Done,
}

impl CrawlState {
    pub fn phase(&self) -> CrawlPhase {
        match self {
            Self::Fetching(_) => CrawlPhase::Fetching,
            Self::Accumulating(_) => CrawlPhase::Accumulating,
            Self::Done => CrawlPhase::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &CrawlState) -> bool {
        self.phase().can_transition_to(next.phase())
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching(url) => write!(f, "fetching {}", url),
            Self::Accumulating(page) => write!(f, "accumulating {} listings", page.listings.len()),
            Self::Done => write!(f, "done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetching() -> CrawlState {
        CrawlState::Fetching(Url::parse("https://example.com/search").unwrap())
    }

    #[test]
    fn test_legal_transitions() {
        let accumulating = CrawlState::Accumulating(PageExtraction::default());

        assert!(fetching().can_transition_to(&accumulating));
        assert!(accumulating.can_transition_to(&fetching()));
        assert!(accumulating.can_transition_to(&CrawlState::Done));
    }

    #[test]
    fn test_illegal_transitions() {
        let accumulating = CrawlState::Accumulating(PageExtraction::default());

        // A fetch is always followed by its page being merged
        assert!(!fetching().can_transition_to(&CrawlState::Done));
        assert!(!fetching().can_transition_to(&fetching()));
        assert!(!accumulating.can_transition_to(&accumulating));

        // Done is terminal
        assert!(!CrawlState::Done.can_transition_to(&fetching()));
        assert!(!CrawlState::Done.can_transition_to(&accumulating));
        assert!(!CrawlState::Done.can_transition_to(&CrawlState::Done));
    }

    #[test]
    fn test_is_done() {
        assert!(CrawlState::Done.is_done());
        assert!(!fetching().is_done());
        assert!(CrawlPhase::Done.is_terminal());
        assert!(!CrawlPhase::Accumulating.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlPhase::Accumulating.to_string(), "accumulating");
        assert_eq!(fetching().to_string(), "fetching https://example.com/search");
        assert_eq!(CrawlState::Done.to_string(), "done");
    }
}
