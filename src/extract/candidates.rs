use crate::dom::{DomIndex, DomTree, NodeId};

/// An anchor with an image inside and an absolute http(s) target
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLink {
    /// The anchor element
    pub anchor: NodeId,

    /// Absolute URL the anchor points to
    pub href: String,
}

/// Find every image-bearing anchor with a usable absolute URL, in document order.
pub fn discover(tree: &DomTree, index: &DomIndex<'_>) -> Vec<CandidateLink> {
    index
        .elements()
        .filter(|&id| index.node(id).is_tag("a"))
        .filter_map(|id| {
            let raw = index.node(id).get_attribute("href")?;
            if is_noop_href(raw) || !index.has_descendant_tag(id, "img") {
                return None;
            }

            let href = tree.resolve_url(raw)?;
            if !href.starts_with("http") {
                log::trace!("Skipping non-http link {}", href);
                return None;
            }

            Some(CandidateLink { anchor: id, href })
        })
        .collect()
}

/// Hrefs that do not navigate anywhere
fn is_noop_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:")
}
