//! Search-results page extraction
//!
//! A results page yields the listing cards above the termination marker and
//! the URL of the next page, if the pagination block offers one.

use crate::extract::profile::MarkupProfile;
use crate::extract::rules::{non_empty, RuleChain};
use crate::extract::text::{collapsed_text, excerpt};
use crate::model::{ListingSummary, PageExtraction};
use crate::url::canonicalize_url;
use scraper::{ElementRef, Html};
use url::Url;

/// Characters of card text used as a title when the card has no title element
const TITLE_EXCERPT_CHARS: usize = 100;

/// Extracts listing summaries and pagination metadata from a results page
///
/// # Extraction Rules
///
/// 1. Find the results container by id, falling back to the first element
///    whose id contains the configured token
/// 2. Cut the container's markup at the termination marker, if present;
///    cards below the marker never enter the result
/// 3. Read each card's link, title and thumbnail; cards without a
///    resolvable link are dropped
/// 4. Read the next-page control from the pagination block of the whole
///    document
///
/// Missing markup never fails the extraction: a page without a container
/// yields no listings.
///
/// # Example
///
/// ```
/// use adsweep::extract::{extract_listing_page, MarkupProfile};
/// use url::Url;
///
/// let html = r#"<div id="serpMainContent">
///     <div class="postDetails"><a href="/ad/1"><h2>Corolla 2015</h2></a></div>
/// </div>"#;
/// let base = Url::parse("https://example.com/en/cars").unwrap();
/// let page = extract_listing_page(html, &base, &MarkupProfile::standard().unwrap());
///
/// assert_eq!(page.listings.len(), 1);
/// assert_eq!(page.listings[0].title, "Corolla 2015");
/// assert!(!page.reached_termination_marker);
/// ```
pub fn extract_listing_page(html: &str, base_url: &Url, profile: &MarkupProfile) -> PageExtraction {
    let document = Html::parse_document(html);
    let next_page_url = extract_next_page(&document, base_url, profile);

    let Some(container) = find_results_container(&document, profile) else {
        tracing::debug!("No results container on {}", base_url);
        return PageExtraction {
            listings: Vec::new(),
            reached_termination_marker: false,
            next_page_url,
        };
    };

    let markup = container.html();
    let (genuine, reached_termination_marker) =
        truncate_at_marker(&markup, &profile.termination_marker);
    if reached_termination_marker {
        tracing::debug!("Termination marker found on {}", base_url);
    }

    let fragment = Html::parse_fragment(genuine);
    let mut listings = Vec::new();

    for item in fragment.select(&profile.item) {
        match extract_summary(item, base_url, profile) {
            Some(summary) => listings.push(summary),
            None => tracing::debug!("Dropping result card without a link on {}", base_url),
        }
    }

    PageExtraction {
        listings,
        reached_termination_marker,
        next_page_url,
    }
}

/// Locates the results container, by exact id first, then by id substring
fn find_results_container<'d>(document: &'d Html, profile: &MarkupProfile) -> Option<ElementRef<'d>> {
    let chain = RuleChain::new()
        .rule("exact id", |doc: &'d Html| {
            doc.select(&profile.with_id)
                .find(|el| el.value().id() == Some(profile.results_container_id.as_str()))
        })
        .rule("id token", |doc: &'d Html| {
            doc.select(&profile.with_id).find(|el| {
                el.value()
                    .id()
                    .map_or(false, |id| id.contains(profile.results_container_token.as_str()))
            })
        });

    chain.first_match(document)
}

/// Splits markup at the first occurrence of the marker
///
/// Returns the markup above the marker and whether the marker was found.
pub(crate) fn truncate_at_marker<'m>(markup: &'m str, marker: &str) -> (&'m str, bool) {
    match markup.find(marker) {
        Some(index) => (&markup[..index], true),
        None => (markup, false),
    }
}

fn extract_summary(item: ElementRef<'_>, base_url: &Url, profile: &MarkupProfile) -> Option<ListingSummary> {
    let url = item_link(item, base_url, profile)?;
    let title = item_title(item, profile);
    let thumbnail_url = item_thumbnail(item, base_url, profile).unwrap_or_default();

    Some(ListingSummary {
        url,
        title,
        thumbnail_url,
    })
}

/// The card's own first link, else an anchor wrapping the card
fn item_link<'a>(item: ElementRef<'a>, base_url: &Url, profile: &MarkupProfile) -> Option<Url> {
    let resolve = |anchor: ElementRef<'a>| {
        let href = anchor.value().attr("href")?;
        canonicalize_url(href, base_url).ok()
    };

    let chain = RuleChain::new()
        .rule("own link", |item: ElementRef<'a>| {
            item.select(&profile.any_link).next().and_then(resolve)
        })
        .rule("parent anchor", |item: ElementRef<'a>| {
            enclosing_anchor(item, 1).and_then(resolve)
        })
        .rule("grandparent anchor", |item: ElementRef<'a>| {
            enclosing_anchor(item, 2).and_then(resolve)
        });

    chain.first_match(item)
}

/// The ancestor `depth` levels up, if it is an anchor
fn enclosing_anchor(item: ElementRef<'_>, depth: usize) -> Option<ElementRef<'_>> {
    let node = item.ancestors().nth(depth - 1)?;
    let element = ElementRef::wrap(node)?;
    (element.value().name() == "a").then_some(element)
}

fn item_title<'a>(item: ElementRef<'a>, profile: &MarkupProfile) -> String {
    let chain = RuleChain::new()
        .rule("title element", |item: ElementRef<'a>| {
            item.select(&profile.title)
                .map(collapsed_text)
                .find(|text| !text.is_empty())
        })
        .rule("text excerpt", |item: ElementRef<'a>| {
            non_empty(excerpt(&collapsed_text(item), TITLE_EXCERPT_CHARS))
        });

    chain.first_match(item).unwrap_or_default()
}

/// The gallery image of the card's wrapper, else any image in that wrapper
fn item_thumbnail<'a>(item: ElementRef<'a>, base_url: &Url, profile: &MarkupProfile) -> Option<String> {
    let post = item
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| profile.post_container.matches(ancestor))
        .unwrap_or(item);

    let chain = RuleChain::new()
        .rule("gallery image", |post: ElementRef<'a>| {
            post.select(&profile.gallery_image)
                .find_map(|img| image_source(img, base_url))
        })
        .rule("any image", |post: ElementRef<'a>| {
            post.select(&profile.any_image)
                .find_map(|img| image_source(img, base_url))
        });

    chain.first_match(post)
}

/// An image's absolute URL, preferring a real `src` over a lazy-load one
fn image_source(img: ElementRef<'_>, base_url: &Url) -> Option<String> {
    let src = img
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .or_else(|| img.value().attr("data-src").map(str::trim))
        .filter(|src| !src.is_empty())?;

    base_url.join(src).ok().map(String::from)
}

/// Reads the next-page control, unless it is missing or disabled
fn extract_next_page<'d>(document: &'d Html, base_url: &Url, profile: &MarkupProfile) -> Option<Url> {
    let pagination = document.select(&profile.pagination).next()?;
    let control = pagination.select(&profile.next_page).next()?;

    if is_disabled(control) {
        tracing::debug!("Next-page control is disabled on {}", base_url);
        return None;
    }

    let chain = RuleChain::new()
        .rule("control href", |control: ElementRef<'d>| {
            control.value().attr("href").map(str::to_string)
        })
        .rule("inner link", |control: ElementRef<'d>| {
            control
                .select(&profile.any_link)
                .find_map(|a| a.value().attr("href").map(str::to_string))
        });

    let href = chain.first_match(control)?;
    canonicalize_url(&href, base_url).ok()
}

fn is_disabled(control: ElementRef<'_>) -> bool {
    let element = control.value();
    element.attr("disabled").is_some()
        || element.attr("aria-disabled") == Some("true")
        || element.classes().any(|class| class == "disabled")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> MarkupProfile {
        MarkupProfile::standard().unwrap()
    }

    fn base() -> Url {
        Url::parse("https://example.com/en/cars?page=1").unwrap()
    }

    fn card(id: u32, title: &str) -> String {
        format!(
            r#"<a class="postListItem" href="/en/ad/{id}">
                <div class="imageGallery"><img src="/img/{id}.jpg"></div>
                <div class="postDetails"><h2 class="postTitle">{title}</h2><span>1,000 JOD</span></div>
            </a>"#
        )
    }

    fn page(cards: &str) -> String {
        format!(
            r#"<html><body><div id="serpMainContent">{cards}</div></body></html>"#
        )
    }

    #[test]
    fn test_extracts_cards_in_order() {
        let html = page(&format!("{}{}", card(1, "Corolla"), card(2, "Elantra")));
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings.len(), 2);
        assert_eq!(result.listings[0].url.as_str(), "https://example.com/en/ad/1");
        assert_eq!(result.listings[0].title, "Corolla");
        assert_eq!(result.listings[0].thumbnail_url, "https://example.com/img/1.jpg");
        assert_eq!(result.listings[1].url.as_str(), "https://example.com/en/ad/2");
        assert!(!result.reached_termination_marker);
        assert_eq!(result.next_page_url, None);
    }

    #[test]
    fn test_termination_marker_truncates() {
        let html = page(&format!(
            "{}<h3>Recommended Ads</h3>{}",
            card(1, "Corolla"),
            card(2, "Sponsored Accent")
        ));
        let result = extract_listing_page(&html, &base(), &profile());

        assert!(result.reached_termination_marker);
        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.listings[0].title, "Corolla");
    }

    #[test]
    fn test_container_id_token_fallback() {
        let html = format!(
            r#"<html><body><div id="serpMainContent_v2">{}</div></body></html>"#,
            card(7, "Civic")
        );
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.listings[0].url.as_str(), "https://example.com/en/ad/7");
    }

    #[test]
    fn test_missing_container_yields_nothing() {
        let html = format!("<html><body><div id=\"main\">{}</div></body></html>", card(1, "X"));
        let result = extract_listing_page(&html, &base(), &profile());

        assert!(result.listings.is_empty());
        assert!(!result.reached_termination_marker);
    }

    #[test]
    fn test_own_link_preferred() {
        let html = page(
            r#"<div class="postDetails"><a href="/en/ad/55?utm_source=serp"><h2>Golf</h2></a></div>"#,
        );
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings[0].url.as_str(), "https://example.com/en/ad/55");
    }

    #[test]
    fn test_unresolvable_first_link_not_skipped() {
        let html = page(&format!(
            r#"<div class="postDetails"><a href="javascript:void(0)">Save</a><a href="/en/ad/12"><h2>Golf</h2></a></div>{}"#,
            card(3, "Linked")
        ));
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.listings[0].title, "Linked");
    }

    #[test]
    fn test_grandparent_anchor() {
        let html = page(
            r#"<a href="/en/ad/9"><div class="wrap"><div class="postDetails"><h2>Golf</h2></div></div></a>"#,
        );
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.listings[0].url.as_str(), "https://example.com/en/ad/9");
    }

    #[test]
    fn test_card_without_link_dropped() {
        let html = page(&format!(
            r#"<div class="postDetails"><h2>No link</h2></div>{}"#,
            card(3, "Linked")
        ));
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.listings[0].title, "Linked");
    }

    #[test]
    fn test_title_falls_back_to_excerpt() {
        let long_text = "abcdefghij".repeat(15);
        let html = page(&format!(
            r#"<div class="postDetails"><a href="/en/ad/4"><span>{}</span></a></div>"#,
            long_text
        ));
        let result = extract_listing_page(&html, &base(), &profile());

        let title = &result.listings[0].title;
        assert_eq!(title.chars().count(), 100);
        assert!(title.starts_with("abcdefghijabcdefghij"));
    }

    #[test]
    fn test_thumbnail_falls_back_to_any_image() {
        let html = page(
            r#"<a class="postListItem" href="/en/ad/5">
                <img data-src="https://cdn.example.com/5.jpg" src="data:image/gif;base64,R0lG">
                <div class="postDetails"><h2>Sonata</h2></div>
            </a>"#,
        );
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings[0].thumbnail_url, "https://cdn.example.com/5.jpg");
    }

    #[test]
    fn test_missing_thumbnail_is_empty() {
        let html = page(r#"<div class="postDetails"><a href="/en/ad/6"><h2>Rio</h2></a></div>"#);
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(result.listings[0].thumbnail_url, "");
    }

    #[test]
    fn test_next_page_url() {
        let html = format!(
            r#"<html><body><div id="serpMainContent">{}</div>
               <div id="pagination"><a data-id="nextPageArrow" href="/en/cars?page=2">Next</a></div>
               </body></html>"#,
            card(1, "Corolla")
        );
        let result = extract_listing_page(&html, &base(), &profile());

        assert_eq!(
            result.next_page_url.map(String::from),
            Some("https://example.com/en/cars?page=2".to_string())
        );
    }

    #[test]
    fn test_next_page_inner_link() {
        let html = r#"<div id="pagination"><li data-id="nextPageArrow"><a href="?page=3">›</a></li></div>"#;
        let result = extract_listing_page(html, &base(), &profile());

        assert_eq!(
            result.next_page_url.map(String::from),
            Some("https://example.com/en/cars?page=3".to_string())
        );
    }

    #[test]
    fn test_disabled_next_page_ignored() {
        for control in [
            r#"<a data-id="nextPageArrow" class="disabled" href="/en/cars?page=2">Next</a>"#,
            r#"<a data-id="nextPageArrow" aria-disabled="true" href="/en/cars?page=2">Next</a>"#,
            r#"<button data-id="nextPageArrow" disabled>Next</button>"#,
        ] {
            let html = format!(r#"<div id="pagination">{}</div>"#, control);
            let result = extract_listing_page(&html, &base(), &profile());
            assert_eq!(result.next_page_url, None, "control {} not disabled", control);
        }
    }

    #[test]
    fn test_next_page_outside_pagination_ignored() {
        let html = r#"<a data-id="nextPageArrow" href="/en/cars?page=2">Next</a>"#;
        let result = extract_listing_page(html, &base(), &profile());
        assert_eq!(result.next_page_url, None);
    }

    #[test]
    fn test_truncate_at_marker() {
        assert_eq!(truncate_at_marker("abc MARK def", "MARK"), ("abc ", true));
        assert_eq!(truncate_at_marker("abc", "MARK"), ("abc", false));
    }
}
