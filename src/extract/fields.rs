//! Name and price resolution inside a card root.
//!
//! Each field has an ordered rule list, most specific first. The first
//! element (by rule, then by document order) whose text passes the field's
//! validity check wins.

use crate::dom::{DomIndex, ElementNode, NodeId};
use crate::extract::ExtractorConfig;

/// One rule of a selector cascade: which elements qualify and how their text is read
#[derive(Clone, Copy)]
pub struct Matcher {
    pub label: &'static str,
    pub predicate: fn(&ElementNode) -> bool,
    pub extract: fn(&DomIndex<'_>, NodeId) -> String,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher").field("label", &self.label).finish()
    }
}

pub const NAME_MATCHERS: &[Matcher] = &[
    Matcher { label: "itemprop-name", predicate: is_itemprop_name, extract: text_or_content },
    Matcher { label: "test-id-name", predicate: is_test_id_name, extract: element_text },
    Matcher { label: "product-name-class", predicate: is_product_name_class, extract: element_text },
    Matcher { label: "name-class", predicate: is_name_class, extract: element_text },
    Matcher { label: "heading", predicate: is_heading, extract: element_text },
    Matcher { label: "anchor", predicate: is_anchor, extract: element_text },
    Matcher { label: "generic", predicate: is_generic_container, extract: element_text },
];

pub const PRICE_MATCHERS: &[Matcher] = &[
    Matcher { label: "itemprop-price", predicate: is_itemprop_price, extract: text_or_content },
    Matcher { label: "data-price", predicate: is_data_price, extract: text_or_data_price },
    Matcher { label: "price-class", predicate: is_price_class, extract: element_text },
    Matcher { label: "amount-class", predicate: is_amount_class, extract: element_text },
    Matcher { label: "generic", predicate: is_generic_container, extract: element_text },
];

fn is_itemprop_name(node: &ElementNode) -> bool {
    node.attribute_eq("itemprop", "name")
}

fn is_test_id_name(node: &ElementNode) -> bool {
    test_id_contains(node, &["name", "title"])
}

fn is_product_name_class(node: &ElementNode) -> bool {
    ["product-name", "product-title", "product_name", "product_title", "productname", "producttitle"]
        .iter()
        .any(|needle| node.class_contains(needle))
}

fn is_name_class(node: &ElementNode) -> bool {
    node.class_contains("name") || node.class_contains("title")
}

fn is_heading(node: &ElementNode) -> bool {
    ["h1", "h2", "h3", "h4", "h5", "h6"].iter().any(|tag| node.is_tag(tag))
}

fn is_anchor(node: &ElementNode) -> bool {
    node.is_tag("a")
}

fn is_generic_container(node: &ElementNode) -> bool {
    ["span", "p", "strong", "b", "div"].iter().any(|tag| node.is_tag(tag))
}

fn is_itemprop_price(node: &ElementNode) -> bool {
    node.attribute_eq("itemprop", "price")
}

fn is_data_price(node: &ElementNode) -> bool {
    node.get_attribute("data-price").is_some() || test_id_contains(node, &["price"])
}

fn is_price_class(node: &ElementNode) -> bool {
    node.class_contains("price")
}

fn is_amount_class(node: &ElementNode) -> bool {
    node.class_contains("amount") || node.class_contains("cost")
}

fn test_id_contains(node: &ElementNode, needles: &[&str]) -> bool {
    ["data-testid", "data-test", "data-qa"].iter().any(|key| {
        node.get_attribute(key).is_some_and(|value| {
            let value = value.to_ascii_lowercase();
            needles.iter().any(|needle| value.contains(needle))
        })
    })
}

/// Trimmed text with internal whitespace runs collapsed to single spaces
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(index: &DomIndex<'_>, id: NodeId) -> String {
    clean_text(index.text(id))
}

fn text_or_content(index: &DomIndex<'_>, id: NodeId) -> String {
    text_or_attribute(index, id, "content")
}

fn text_or_data_price(index: &DomIndex<'_>, id: NodeId) -> String {
    text_or_attribute(index, id, "data-price")
}

fn text_or_attribute(index: &DomIndex<'_>, id: NodeId, key: &str) -> String {
    let text = element_text(index, id);
    if !text.is_empty() {
        return text;
    }
    index.node(id).get_attribute(key).map(|v| clean_text(v)).unwrap_or_default()
}

/// Name validity: bounded length and at least one letter, which rules out
/// symbol-only strings and lone price-like tokens.
pub fn is_valid_name(text: &str, config: &ExtractorConfig) -> bool {
    let len = text.chars().count();
    config.name_len.contains(&len) && text.chars().any(char::is_alphabetic)
}

/// Price validity: contains a digit and is short.
pub fn is_valid_price(text: &str, config: &ExtractorConfig) -> bool {
    text.chars().any(|c| c.is_ascii_digit()) && text.chars().count() < config.max_price_len
}

/// Run a cascade over the descendants of `card`.
///
/// The triggering anchor is skipped when its rule matched other elements too.
pub fn resolve_field(
    index: &DomIndex<'_>,
    card: NodeId,
    trigger: NodeId,
    matchers: &[Matcher],
    is_valid: impl Fn(&str) -> bool,
) -> Option<String> {
    for matcher in matchers {
        let matched: Vec<NodeId> = index
            .descendant_elements(card)
            .filter(|&id| (matcher.predicate)(index.node(id)))
            .collect();

        for &id in &matched {
            if id == trigger && matched.len() > 1 {
                continue;
            }
            let text = (matcher.extract)(index, id);
            if is_valid(&text) {
                log::trace!("Field resolved by rule '{}': {}", matcher.label, text);
                return Some(text);
            }
        }
    }
    None
}

/// Resolved name and price of one card; empty strings mean "not found"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    pub name: String,
    pub price: String,
}

/// Resolve name and price for a card, falling back to the trigger image's
/// `alt` text for the name.
pub fn resolve(index: &DomIndex<'_>, card: NodeId, trigger: NodeId, config: &ExtractorConfig) -> CardFields {
    let name = resolve_field(index, card, trigger, NAME_MATCHERS, |t| is_valid_name(t, config))
        .or_else(|| image_alt(index, trigger).filter(|alt| is_valid_name(alt, config)))
        .unwrap_or_default();

    let price = resolve_field(index, card, trigger, PRICE_MATCHERS, |t| is_valid_price(t, config))
        .unwrap_or_default();

    CardFields { name, price }
}

fn image_alt(index: &DomIndex<'_>, anchor: NodeId) -> Option<String> {
    let img = index.first_descendant_tag(anchor, "img")?;
    index.node(img).get_attribute("alt").map(|alt| clean_text(alt))
}
