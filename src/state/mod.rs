//! State module for tracking pagination progress
//!
//! # Components
//!
//! - `CrawlState`: The pagination state machine (fetching, accumulating, done)
//! - `CrawlPhase`: A state's phase without its payload, used for transition checks
//! - `CrawlContext`: Listings, seen identities and visited pages of one run

mod context;
mod crawl_state;

// Re-export main types
pub use context::CrawlContext;
pub use crawl_state::{CrawlPhase, CrawlState};
