//! Detail page extraction
//!
//! A detail page carries the price, the free-text description and a list of
//! labelled attribute fields. Fields come in two layouts: a regular
//! key/value row with a bold value, and a full-row field whose wide value
//! may hold a comma-joined list.

use crate::extract::profile::MarkupProfile;
use crate::extract::rules::{non_empty, RuleChain};
use crate::extract::text::{block_text, collapse_whitespace, collapsed_text};
use crate::model::{AttributeValue, Attributes, ListingDetail};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Node};
use std::str::FromStr;

/// Extracts price, description and attributes from a detail page
///
/// Every part degrades independently: a page without a price block still
/// yields its attributes, and a page matching nothing yields
/// `ListingDetail::default()`.
pub fn extract_detail_page(html: &str, profile: &MarkupProfile) -> ListingDetail {
    let document = Html::parse_document(html);

    let raw_price_text = document
        .select(&profile.price)
        .next()
        .map(collapsed_text)
        .unwrap_or_default();
    let price = parse_price(&raw_price_text);

    let description = document
        .select(&profile.description)
        .next()
        .map(block_text)
        .unwrap_or_default();

    let attributes = extract_attributes(&document, profile);

    ListingDetail {
        price,
        raw_price_text,
        description,
        attributes,
    }
}

/// Parses a price from free text
///
/// Every character other than an ASCII digit or `.` is dropped and the rest
/// parsed as a decimal number.
///
/// # Examples
///
/// ```
/// use adsweep::extract::parse_price;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_price("1,234 JOD"), Some(Decimal::from(1234)));
/// assert_eq!(parse_price("Call for price"), None);
/// assert_eq!(parse_price("-"), None);
/// ```
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

fn extract_attributes(document: &Html, profile: &MarkupProfile) -> Attributes {
    let mut attributes = Attributes::new();

    for field in document.select(&profile.field) {
        if let Some((label, value)) = read_field(field, profile) {
            attributes.insert(label, value);
        }
    }

    // Some pages render full-row fields outside the field list
    for row in document.select(&profile.full_row_item) {
        let Some(label) = field_label(row, profile) else {
            continue;
        };
        let label_text = collapsed_text(label);

        if label_text.is_empty()
            || attributes.contains_key(&label_text)
            || profile.is_excluded_full_row_label(&label_text)
        {
            continue;
        }

        if let Some(text) = full_row_text(row, label, profile) {
            tracing::trace!(label = %label_text, "attribute from full-row pass");
            attributes.insert(label_text, AttributeValue::from_field_text(&text));
        }
    }

    attributes
}

fn read_field(field: ElementRef<'_>, profile: &MarkupProfile) -> Option<(String, AttributeValue)> {
    let label = field_label(field, profile)?;
    let label_text = non_empty(collapsed_text(label))?;

    if is_full_row(field, profile) {
        let text = full_row_text(field, label, profile)?;
        return Some((label_text, AttributeValue::from_field_text(&text)));
    }

    let value = field
        .select(&profile.field_value)
        .map(collapsed_text)
        .next()
        .and_then(non_empty)?;

    Some((label_text, AttributeValue::Scalar(value)))
}

fn is_full_row(field: ElementRef<'_>, profile: &MarkupProfile) -> bool {
    field
        .value()
        .classes()
        .any(|class| class == profile.full_row_class)
        || field.select(&profile.wide_value).next().is_some()
}

/// The label element: a direct child first, any descendant otherwise
fn field_label<'a>(field: ElementRef<'a>, profile: &MarkupProfile) -> Option<ElementRef<'a>> {
    let chain = RuleChain::new()
        .rule("label child", |field: ElementRef<'a>| {
            field
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| profile.field_label.matches(child))
        })
        .rule("label descendant", |field: ElementRef<'a>| {
            field.select(&profile.field_label).next()
        });

    chain.first_match(field)
}

/// The value text of a full-row field
///
/// Read from the wide value element; without one, everything in the field
/// except the label.
fn full_row_text<'a>(
    field: ElementRef<'a>,
    label: ElementRef<'a>,
    profile: &MarkupProfile,
) -> Option<String> {
    let chain = RuleChain::new()
        .rule("wide value", |field: ElementRef<'a>| {
            field
                .select(&profile.wide_value)
                .next()
                .map(collapsed_text)
                .and_then(non_empty)
        })
        .rule("text beside label", |field: ElementRef<'a>| {
            let text: String = field
                .children()
                .filter(|child| child.id() != label.id())
                .map(|child| match child.value() {
                    Node::Text(text) => String::from(&**text),
                    Node::Element(_) => ElementRef::wrap(child)
                        .map(|element| element.text().collect())
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            non_empty(collapse_whitespace(&text))
        });

    chain.first_match(field)
}
