//! URL handling for Adsweep
//!
//! Listing identities are canonical absolute URLs. This module resolves the
//! hrefs found in result cards against the page they came from and brings
//! them to one canonical spelling.

mod normalize;

pub use normalize::{canonicalize_url, parse_absolute};
