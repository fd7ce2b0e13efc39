//! Static markup to snapshot conversion.
//!
//! Used for saved pages and fixtures. The result carries no layout, so
//! bounding boxes are absent and every element is reported visible.

use crate::dom::element::ElementNode;
use crate::dom::tree::DomTree;
use crate::error::{Result, ScoutError};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

const SKIPPED_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "iframe"];

/// Parse a full HTML document into a [`DomTree`] rooted at `body`.
///
/// A `<base href>` in the document takes precedence over `base_url`, the
/// same way a browser resolves links.
pub fn parse_document(html: &str, base_url: Option<&str>) -> Result<DomTree> {
    let document = Html::parse_document(html);

    let body_selector = Selector::parse("body")
        .map_err(|e| ScoutError::DomParseFailed(format!("Invalid body selector: {:?}", e)))?;
    let base_selector = Selector::parse("base[href]")
        .map_err(|e| ScoutError::DomParseFailed(format!("Invalid base selector: {:?}", e)))?;

    let root_element = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let document_base = document
        .select(&base_selector)
        .next()
        .and_then(|base| base.value().attr("href"))
        .map(str::to_string);

    let url = match (base_url.and_then(|b| Url::parse(b).ok()), document_base) {
        (Some(base), Some(href)) => base.join(&href).ok().map(|u| u.to_string()),
        (None, Some(href)) => Url::parse(&href).ok().map(|u| u.to_string()),
        (Some(base), None) => Some(base.to_string()),
        (None, None) => None,
    };

    Ok(DomTree { url, root: convert_element(root_element) })
}

fn convert_element(element: ElementRef<'_>) -> ElementNode {
    let value = element.value();
    let mut node = ElementNode::new(value.name()).with_visibility(true);

    for (key, attr) in value.attrs() {
        node.add_attribute(key, attr);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => node.add_child(ElementNode::text_node(&**text)),
            Node::Element(child_element) => {
                if SKIPPED_TAGS.contains(&child_element.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    node.add_child(convert_element(child_ref));
                }
            }
            _ => {}
        }
    }

    node
}
