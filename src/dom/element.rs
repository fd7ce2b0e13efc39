use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag name used for text nodes inside the snapshot
pub const TEXT_NODE: &str = "#text";

/// Represents a DOM node of a page snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// Lower-case HTML tag name (e.g., "a", "img", "span"), or `#text`
    pub tag_name: String,

    /// Element attributes (e.g., id, class, href, etc.)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Raw text of a `#text` node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,

    /// Whether the element was rendered (non-zero box, not hidden)
    #[serde(default)]
    pub is_visible: bool,

    /// Bounding box from the rendered layout, absent for static snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// Bounding box coordinates for an element
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: HashMap::new(),
            text_content: None,
            children: Vec::new(),
            is_visible: false,
            bounding_box: None,
        }
    }

    /// Create a text node
    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            tag_name: TEXT_NODE.to_string(),
            attributes: HashMap::new(),
            text_content: Some(text.into()),
            children: Vec::new(),
            is_visible: true,
            bounding_box: None,
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: add one attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: append a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(ElementNode::text_node(text));
        self
    }

    /// Builder method: append a child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder method: set visibility
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    /// Builder method: set bounding box
    pub fn with_bounding_box(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounding_box = Some(BoundingBox { x, y, width, height });
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        if let Some(classes) = self.attributes.get("class") {
            classes.split_whitespace().any(|c| c == class_name)
        } else {
            false
        }
    }

    /// Case-insensitive substring match against the raw `class` attribute.
    /// `needle` must already be lower case.
    pub fn class_contains(&self, needle: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.to_ascii_lowercase().contains(needle))
    }

    /// Case-insensitive comparison of an attribute value
    pub fn attribute_eq(&self, key: &str, value: &str) -> bool {
        self.attributes
            .get(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Whether this is a `#text` node
    pub fn is_text(&self) -> bool {
        self.tag_name == TEXT_NODE
    }

    /// Concatenated text of this node and all its descendants (DOM `textContent`)
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text_content {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Convert to a simplified string representation
    pub fn to_simple_string(&self) -> String {
        if self.is_text() {
            return self.text_content.clone().unwrap_or_default();
        }

        let mut parts = vec![format!("<{}", self.tag_name)];

        if let Some(id) = self.id() {
            parts.push(format!(" id=\"{}\"", id));
        }

        if let Some(class) = self.attributes.get("class") {
            parts.push(format!(" class=\"{}\"", class));
        }

        if let Some(href) = self.attributes.get("href") {
            parts.push(format!(" href=\"{}\"", href));
        }

        parts.push(">".to_string());

        let text = self.text();
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.chars().take(50).collect());
        }

        parts.join("")
    }
}

impl BoundingBox {
    /// Create a new BoundingBox
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if the bounding box is visible (has non-zero dimensions)
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Calculate the area of the bounding box
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_creation() {
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), "test-id".to_string());
        attrs.insert("class".to_string(), "card primary".to_string());

        let element = ElementNode::new("DIV")
            .with_attributes(attrs)
            .with_text("Red Mug")
            .with_visibility(true);

        assert_eq!(element.tag_name, "div");
        assert_eq!(element.id(), Some(&"test-id".to_string()));
        assert_eq!(element.text(), "Red Mug");
        assert!(element.is_visible);
    }

    #[test]
    fn test_has_class() {
        let mut element = ElementNode::new("div");
        element.add_attribute("class", "container main active");

        assert!(element.has_class("container"));
        assert!(element.has_class("main"));
        assert!(!element.has_class("hidden"));
    }

    #[test]
    fn test_class_contains_ignores_case() {
        let element = ElementNode::new("div").with_attribute("class", "s-ProductTile__wrapper");

        assert!(element.class_contains("producttile"));
        assert!(element.class_contains("tile"));
        assert!(!element.class_contains("listing"));
        assert!(!ElementNode::new("div").class_contains("tile"));
    }

    #[test]
    fn test_attribute_eq() {
        let element = ElementNode::new("span").with_attribute("itemprop", " Price ");
        assert!(element.attribute_eq("itemprop", "price"));
        assert!(!element.attribute_eq("itemprop", "name"));
        assert!(!element.attribute_eq("role", "price"));
    }

    #[test]
    fn test_text_preserves_document_order() {
        let heading = ElementNode::new("h3")
            .with_text("Red ")
            .with_child(ElementNode::new("b").with_text("Mug"))
            .with_text(" Deluxe");

        assert_eq!(heading.text(), "Red Mug Deluxe");
        assert!(heading.children[0].is_text());
        assert!(!heading.children[1].is_text());
    }

    #[test]
    fn test_serialization() {
        let element = ElementNode::new("a")
            .with_attribute("href", "/p/1")
            .with_text("Mug")
            .with_bounding_box(0.0, 0.0, 10.0, 10.0)
            .with_visibility(true);

        let json = serde_json::to_string(&element).unwrap();
        let deserialized: ElementNode = serde_json::from_str(&json).unwrap();

        assert_eq!(element, deserialized);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);

        assert!(bbox.is_visible());
        assert_eq!(bbox.area(), 5000.0);

        let invisible_bbox = BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        assert!(!invisible_bbox.is_visible());
    }

    #[test]
    fn test_to_simple_string() {
        let element = ElementNode::new("a")
            .with_attribute("id", "p1")
            .with_attribute("class", "tile")
            .with_attribute("href", "/p/1")
            .with_text("Submit");

        let simple = element.to_simple_string();
        assert!(simple.contains("<a"));
        assert!(simple.contains("id=\"p1\""));
        assert!(simple.contains("class=\"tile\""));
        assert!(simple.contains("href=\"/p/1\""));
        assert!(simple.contains("Submit"));
    }
}
