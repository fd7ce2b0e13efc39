use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One detected product listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    /// Display name of the product
    pub name: String,

    /// Price exactly as shown on the page (not normalised)
    pub price: String,

    /// Absolute URL of the product page
    pub link: String,
}

impl Product {
    pub fn new(name: impl Into<String>, price: impl Into<String>, link: impl Into<String>) -> Self {
        Self { name: name.into(), price: price.into(), link: link.into() }
    }

    /// The link with any `#fragment` removed
    pub fn link_without_fragment(&self) -> &str {
        strip_fragment(&self.link)
    }

    /// One-line rendering used for summaries and CLI output
    pub fn details_line(&self) -> String {
        format!("Name: {}, Price: {}, Link: {}", self.name, self.price, self.link)
    }
}

/// Remove the `#fragment` part of a URL string
pub fn strip_fragment(link: &str) -> &str {
    match link.find('#') {
        Some(pos) => &link[..pos],
        None => link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("https://shop.test/p/2#color=red"), "https://shop.test/p/2");
        assert_eq!(strip_fragment("https://shop.test/p/2"), "https://shop.test/p/2");
        assert_eq!(strip_fragment("https://shop.test/p/2#"), "https://shop.test/p/2");
    }

    #[test]
    fn test_details_line() {
        let product = Product::new("Red Mug", "$9.99", "https://shop.test/p/1");
        assert_eq!(product.details_line(), "Name: Red Mug, Price: $9.99, Link: https://shop.test/p/1");
    }
}
