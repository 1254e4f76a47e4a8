//! Markup extraction for results and detail pages
//!
//! Extraction never fails: anything the markup does not provide comes back
//! empty, and the callers decide what an empty page means.

mod detail;
mod listing;
mod profile;
mod rules;
mod text;

pub use detail::{extract_detail_page, parse_price};
pub use listing::extract_listing_page;
pub use profile::MarkupProfile;
pub use rules::RuleChain;
