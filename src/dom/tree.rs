use crate::dom::element::{BoundingBox, ElementNode};
use crate::dom::index::DomIndex;
use crate::error::{Result, ScoutError};
use headless_chrome::Tab;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Snapshot of one rendered page
#[derive(Debug, Clone)]
pub struct DomTree {
    /// Document base URL, used to resolve relative links
    pub url: Option<String>,

    /// Root element of the snapshot (normally `body`)
    pub root: ElementNode,
}

/// Flat node record as emitted by `extract_dom.js`
#[derive(Debug, Deserialize)]
struct SnapshotNode {
    tag_name: String,
    #[serde(default)]
    parent: Option<usize>,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    is_visible: bool,
    #[serde(default)]
    bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    url: Option<String>,
    nodes: Vec<SnapshotNode>,
}

impl DomTree {
    /// Create a snapshot without a base URL
    pub fn new(root: ElementNode) -> Self {
        Self { url: None, root }
    }

    /// Builder method: set the document base URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Build DOM tree from a browser tab
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("extract_dom.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| ScoutError::DomParseFailed(format!("Failed to execute DOM extraction script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| ScoutError::DomParseFailed("No value returned from DOM extraction".to_string()))?;

        // The script returns a JSON string to avoid CDP object previews
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| ScoutError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        Self::from_snapshot_json(&json_str)
    }

    /// Rebuild the nested tree from the flat snapshot JSON.
    ///
    /// The flat layout keeps arbitrarily deep pages within serde_json's recursion limit.
    pub fn from_snapshot_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| ScoutError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;

        if snapshot.nodes.is_empty() {
            return Err(ScoutError::DomParseFailed("Snapshot contains no nodes".to_string()));
        }

        let parents: Vec<Option<usize>> = snapshot.nodes.iter().map(|n| n.parent).collect();
        for (i, parent) in parents.iter().enumerate() {
            if matches!(parent, Some(p) if *p >= i) {
                return Err(ScoutError::DomParseFailed(format!(
                    "Node {} references parent {} out of order",
                    i,
                    parent.unwrap_or_default()
                )));
            }
        }

        let mut slots: Vec<Option<ElementNode>> = snapshot
            .nodes
            .into_iter()
            .map(|n| {
                Some(ElementNode {
                    tag_name: n.tag_name,
                    attributes: n.attributes,
                    text_content: n.text,
                    children: Vec::new(),
                    is_visible: n.is_visible,
                    bounding_box: n.bounding_box,
                })
            })
            .collect();

        // Children always follow their parent, so walking backwards attaches
        // every subtree before its parent is moved.
        for i in (1..slots.len()).rev() {
            let Some(mut node) = slots[i].take() else { continue };
            node.children.reverse();
            match parents[i].and_then(|p| slots[p].as_mut()) {
                Some(parent) => parent.children.push(node),
                None => log::trace!("Dropping orphan snapshot node {}", i),
            }
        }

        let mut root = slots[0]
            .take()
            .ok_or_else(|| ScoutError::DomParseFailed("Snapshot root missing".to_string()))?;
        root.children.reverse();

        Ok(Self { url: snapshot.url.filter(|u| !u.is_empty()), root })
    }

    /// Build DOM tree from static markup (no layout information)
    pub fn from_html(html: &str, base_url: Option<&str>) -> Result<Self> {
        crate::dom::html::parse_document(html, base_url)
    }

    /// Flatten into a document-order index for ancestor/descendant queries
    pub fn index(&self) -> DomIndex<'_> {
        DomIndex::new(&self.root)
    }

    /// Parsed base URL, if the snapshot has a valid one
    pub fn base_url(&self) -> Option<Url> {
        self.url.as_deref().and_then(|u| Url::parse(u).ok())
    }

    /// Resolve an `href` against the document base URL.
    ///
    /// Returns `None` for empty hrefs or when the href is relative and no base is known.
    pub fn resolve_url(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        match Url::parse(href) {
            Ok(url) => Some(url.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.base_url().and_then(|base| base.join(href).ok()).map(|u| u.to_string())
            }
            Err(_) => None,
        }
    }

    /// Convert the DOM tree to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root)
            .map_err(|e| ScoutError::DomParseFailed(format!("Failed to serialize DOM to JSON: {}", e)))
    }

    /// Count element nodes in the tree (text nodes excluded)
    pub fn count_elements(&self) -> usize {
        self.index().elements().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> ElementNode {
        ElementNode::new("body")
            .with_child(
                ElementNode::new("header").with_child(
                    ElementNode::new("button").with_attribute("id", "nav-btn").with_text("Menu"),
                ),
            )
            .with_child(
                ElementNode::new("main")
                    .with_child(ElementNode::new("a").with_attribute("href", "/page").with_text("Click here"))
                    .with_child(ElementNode::new("div").with_attribute("class", "content").with_text("Some text")),
            )
    }

    #[test]
    fn test_dom_tree_creation() {
        let tree = DomTree::new(create_test_tree());

        assert_eq!(tree.root.tag_name, "body");
        assert_eq!(tree.root.children.len(), 2);
        assert!(tree.url.is_none());
    }

    #[test]
    fn test_count_elements() {
        let tree = DomTree::new(create_test_tree());

        // body, header, button, main, a, div
        assert_eq!(tree.count_elements(), 6);
    }

    #[test]
    fn test_to_json() {
        let root = ElementNode::new("div")
            .with_attribute("id", "container")
            .with_child(ElementNode::new("span").with_text("Hello"));

        let json = DomTree::new(root).to_json().unwrap();

        assert!(json.contains("\"tag_name\": \"div\""));
        assert!(json.contains("\"id\": \"container\""));
        assert!(json.contains("\"span\""));
        assert!(json.contains("Hello"));
    }

    #[test]
    fn test_from_snapshot_json_rebuilds_nesting() {
        let json = r##"{
            "url": "https://shop.test/list",
            "nodes": [
                {"tag_name": "body", "parent": null, "is_visible": true,
                 "bounding_box": {"x": 0, "y": 0, "width": 1280, "height": 4000}},
                {"tag_name": "article", "parent": 0, "attributes": {"class": "card"}},
                {"tag_name": "h3", "parent": 1},
                {"tag_name": "#text", "parent": 2, "text": "Red Mug"},
                {"tag_name": "span", "parent": 1},
                {"tag_name": "#text", "parent": 4, "text": "$9.99"},
                {"tag_name": "footer", "parent": 0}
            ]
        }"##;

        let tree = DomTree::from_snapshot_json(json).unwrap();

        assert_eq!(tree.url.as_deref(), Some("https://shop.test/list"));
        assert_eq!(tree.root.children.len(), 2);
        let article = &tree.root.children[0];
        assert!(article.has_class("card"));
        assert_eq!(article.children.len(), 2);
        assert_eq!(article.children[0].text(), "Red Mug");
        assert_eq!(article.children[1].text(), "$9.99");
        assert!(tree.root.children[1].is_tag("footer"));
        assert_eq!(tree.root.bounding_box.unwrap().area(), 1280.0 * 4000.0);
    }

    #[test]
    fn test_from_snapshot_json_rejects_bad_input() {
        assert!(DomTree::from_snapshot_json("not json").is_err());
        assert!(DomTree::from_snapshot_json(r#"{"nodes": []}"#).is_err());

        let forward_parent = r#"{"nodes": [
            {"tag_name": "body"},
            {"tag_name": "div", "parent": 2},
            {"tag_name": "div", "parent": 0}
        ]}"#;
        assert!(matches!(
            DomTree::from_snapshot_json(forward_parent),
            Err(ScoutError::DomParseFailed(_))
        ));
    }

    #[test]
    fn test_resolve_url() {
        let tree = DomTree::new(ElementNode::new("body")).with_url("https://shop.test/c/mugs/");

        assert_eq!(tree.resolve_url("/p/1").as_deref(), Some("https://shop.test/p/1"));
        assert_eq!(tree.resolve_url("p/2").as_deref(), Some("https://shop.test/c/mugs/p/2"));
        assert_eq!(
            tree.resolve_url("https://other.test/x#frag").as_deref(),
            Some("https://other.test/x#frag")
        );
        assert_eq!(tree.resolve_url("javascript:void(0)").as_deref(), Some("javascript:void(0)"));
        assert_eq!(tree.resolve_url("   "), None);

        let no_base = DomTree::new(ElementNode::new("body"));
        assert_eq!(no_base.resolve_url("/p/1"), None);
    }
}
