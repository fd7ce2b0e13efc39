use crate::dom::{DomIndex, ElementNode, NodeId};
use crate::extract::ExtractorConfig;
use crate::extract::candidates::CandidateLink;

/// A structural hint that an element is a product card container
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardPattern {
    Tag(&'static str),
    Role(&'static str),
    /// Case-insensitive substring of the `class` attribute (needle is lower case)
    ClassContains(&'static str),
    /// Case-insensitive substring of an arbitrary attribute (needle is lower case)
    AttributeContains(&'static str, &'static str),
}

/// Card-like patterns. Any match qualifies, so the order is irrelevant here.
pub const CARD_PATTERNS: &[CardPattern] = &[
    CardPattern::Tag("article"),
    CardPattern::Tag("li"),
    CardPattern::Role("listitem"),
    CardPattern::AttributeContains("itemtype", "schema.org/product"),
    CardPattern::ClassContains("card"),
    CardPattern::ClassContains("tile"),
    CardPattern::ClassContains("item"),
    CardPattern::ClassContains("product-box"),
];

impl CardPattern {
    pub fn matches(&self, node: &ElementNode) -> bool {
        match *self {
            CardPattern::Tag(tag) => node.is_tag(tag),
            CardPattern::Role(role) => node.attribute_eq("role", role),
            CardPattern::ClassContains(needle) => node.class_contains(needle),
            CardPattern::AttributeContains(key, needle) => node
                .get_attribute(key)
                .is_some_and(|v| v.to_ascii_lowercase().contains(needle)),
        }
    }
}

/// How a card root was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSource {
    /// Nearest ancestor matching a card pattern
    Pattern,
    /// A nearby ancestor that looks like a card by size and content
    Heuristic,
    /// Grandparent, parent or the link itself
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRoot {
    pub node: NodeId,
    pub source: CardSource,
}

fn matches_card_pattern(node: &ElementNode) -> bool {
    CARD_PATTERNS.iter().any(|p| p.matches(node))
}

/// Contains an image, has a card-sized amount of text and, when layout is
/// known, a card-sized bounding box.
fn looks_like_card(index: &DomIndex<'_>, id: NodeId, config: &ExtractorConfig) -> bool {
    if !index.has_descendant_tag(id, "img") {
        return false;
    }

    let text_len = index.text(id).trim().chars().count();
    if !config.card_text_len.contains(&text_len) {
        return false;
    }

    // Static snapshots carry no layout; only text and image criteria apply.
    match index.node(id).bounding_box {
        Some(bbox) => config.card_area.contains(&bbox.area()),
        None => true,
    }
}

/// Resolve the card container for one candidate link. Always returns a node.
pub fn resolve(index: &DomIndex<'_>, link: &CandidateLink, config: &ExtractorConfig) -> CardRoot {
    let anchor = link.anchor;

    if let Some(node) = index.ancestors(anchor).find(|&id| matches_card_pattern(index.node(id)))
    {
        return CardRoot { node, source: CardSource::Pattern };
    }

    if let Some(node) = index
        .ancestors(anchor)
        .take(config.max_card_depth)
        .find(|&id| matches_card_pattern(index.node(id)) || looks_like_card(index, id, config))
    {
        return CardRoot { node, source: CardSource::Heuristic };
    }

    let parent = index.parent(anchor);
    let node = parent
        .and_then(|p| index.parent(p))
        .or(parent)
        .unwrap_or(anchor);
    CardRoot { node, source: CardSource::Fallback }
}
