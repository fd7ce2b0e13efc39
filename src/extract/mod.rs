//! Heuristic product extraction
//!
//! Runs synchronously against one [`DomTree`] snapshot:
//! 1. candidate discovery: image-bearing anchors with absolute http(s) targets
//! 2. card root resolution: pattern ancestor, sized ancestor, or fallback
//! 3. name and price resolution through ordered rule lists
//! 4. admission and deduplication
//!
//! Malformed or unexpected markup only ever yields fewer products.

pub mod candidates;
pub mod card;
pub mod dedup;
pub mod fields;
pub mod product;

pub use candidates::CandidateLink;
pub use card::{CardRoot, CardSource};
pub use product::Product;

use crate::dom::DomTree;
use std::ops::{Range, RangeInclusive};

/// Tunables for the extraction heuristics
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Ancestor levels inspected by the sized-card heuristic
    pub max_card_depth: usize,

    /// Accepted trimmed text length of a heuristic card
    pub card_text_len: RangeInclusive<usize>,

    /// Accepted bounding box area (px²) of a heuristic card
    pub card_area: RangeInclusive<f64>,

    /// Accepted name length
    pub name_len: Range<usize>,

    /// Prices must be shorter than this
    pub max_price_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_card_depth: 3,
            card_text_len: 10..=3000,
            card_area: 1_000.0..=4_000_000.0,
            name_len: 3..250,
            max_price_len: 60,
        }
    }
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set heuristic ancestor depth
    pub fn max_card_depth(mut self, depth: usize) -> Self {
        self.max_card_depth = depth;
        self
    }

    /// Builder method: set heuristic card text bounds
    pub fn card_text_len(mut self, range: RangeInclusive<usize>) -> Self {
        self.card_text_len = range;
        self
    }

    /// Builder method: set heuristic card area bounds
    pub fn card_area(mut self, range: RangeInclusive<f64>) -> Self {
        self.card_area = range;
        self
    }

    /// Builder method: set accepted name length
    pub fn name_len(mut self, range: Range<usize>) -> Self {
        self.name_len = range;
        self
    }

    /// Builder method: set the exclusive upper bound on price length
    pub fn max_price_len(mut self, len: usize) -> Self {
        self.max_price_len = len;
        self
    }
}

/// Counters from one extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub candidates: usize,
    pub admitted: usize,
    pub kept: usize,
}

/// Product extractor with configurable heuristics
#[derive(Debug, Clone, Default)]
pub struct ProductExtractor {
    config: ExtractorConfig,
}

impl ProductExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the deduplicated product list from a snapshot
    pub fn extract(&self, tree: &DomTree) -> Vec<Product> {
        self.extract_with_stats(tree).0
    }

    /// Extract and report how many candidates survived each stage
    pub fn extract_with_stats(&self, tree: &DomTree) -> (Vec<Product>, ExtractionStats) {
        let index = tree.index();
        let links = candidates::discover(tree, &index);

        let admitted: Vec<Product> = links
            .iter()
            .filter_map(|link| {
                let root = card::resolve(&index, link, &self.config);
                let found = fields::resolve(&index, root.node, link.anchor, &self.config);
                let product = dedup::admit(found.name, found.price, link.href.clone());
                if product.is_none() {
                    log::trace!(
                        "Dropped candidate {} (card {:?} via {:?})",
                        link.href,
                        index.node(root.node).to_simple_string(),
                        root.source
                    );
                }
                product
            })
            .collect();

        let stats_admitted = admitted.len();
        let products = dedup::dedup(admitted);
        let stats = ExtractionStats { candidates: links.len(), admitted: stats_admitted, kept: products.len() };

        log::debug!(
            "Extracted {} products ({} candidates, {} admitted) from {}",
            stats.kept,
            stats.candidates,
            stats.admitted,
            tree.url.as_deref().unwrap_or("<unknown>")
        );

        (products, stats)
    }
}

/// Extract products with the default heuristics
pub fn extract(tree: &DomTree) -> Vec<Product> {
    ProductExtractor::default().extract(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Product> {
        extract(&DomTree::from_html(html, Some("https://shop.test/search?q=mug")).unwrap())
    }

    #[test]
    fn test_article_card_scenario() {
        let products = run(
            r#"<body><article>
                <a href="https://shop.test/p/1"><img alt="Red Mug"/></a>
                <span class="price">$9.99</span>
                <h3>Red Mug Deluxe</h3>
            </article></body>"#,
        );

        assert_eq!(products, vec![Product::new("Red Mug Deluxe", "$9.99", "https://shop.test/p/1")]);
    }

    #[test]
    fn test_card_classed_image_link_inside_card() {
        let products = run(
            r#"<body><li class="product"><div class="product-item-info">
                <a class="product-item-photo" href="https://shop.test/p/1"><img></a>
                <div><strong class="product-name"><a>Red Mug Deluxe</a></strong><span class="price">$9.99</span></div>
            </div></li></body>"#,
        );

        assert_eq!(products, vec![Product::new("Red Mug Deluxe", "$9.99", "https://shop.test/p/1")]);
    }

    #[test]
    fn test_config_builders_tighten_field_validity() {
        let tree = DomTree::from_html(
            r#"<body><article><a href="https://shop.test/p/1"><img></a><h3>Red Mug Deluxe</h3><span class="price">$9.99</span></article></body>"#,
            None,
        )
        .unwrap();

        let short_names = ProductExtractor::new(ExtractorConfig::new().name_len(3..10));
        assert!(short_names.extract(&tree).is_empty());

        let short_prices = ProductExtractor::new(ExtractorConfig::new().max_price_len(5));
        assert!(short_prices.extract(&tree).is_empty());

        assert_eq!(ProductExtractor::default().extract(&tree).len(), 1);
    }

    #[test]
    fn test_fragment_variants_collapse() {
        let products = run(
            r#"<body><ul>
                <li><a href="https://shop.test/p/2#color=red"><img></a><h3>Mug</h3><span class="price">$5</span></li>
                <li><a href="https://shop.test/p/2#color=blue"><img></a><h3>Mug</h3><span class="price">$6</span></li>
            </ul></body>"#,
        );

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].link, "https://shop.test/p/2#color=red");
        assert_eq!(products[0].price, "$5");
    }

    #[test]
    fn test_image_link_without_text_is_dropped() {
        let products = run(r#"<body><div><div><a href="https://shop.test/p/3"><img></a></div></div></body>"#);
        assert!(products.is_empty());
    }

    #[test]
    fn test_no_image_anchors_yields_nothing() {
        let products = run(
            r#"<body><article><a href="/p/1">Red Mug</a><span class="price">$9</span></article></body>"#,
        );
        assert!(products.is_empty());
        assert!(run("").is_empty());
    }

    #[test]
    fn test_relative_links_resolved_and_order_preserved() {
        let products = run(
            r#"<body><div class="grid">
                <div class="product-card"><a href="/p/b"><img></a><p class="title">Beta Bowl</p><p class="price">$2</p></div>
                <div class="product-card"><a href="/p/a"><img></a><p class="title">Alpha Cup</p><p class="price">$1</p></div>
                <div class="product-card"><a href="/p/b"><img></a><p class="title">Beta Bowl</p><p class="price">$2</p></div>
            </div></body>"#,
        );

        let links: Vec<_> = products.iter().map(|p| p.link.as_str()).collect();
        assert_eq!(links, vec!["https://shop.test/p/b", "https://shop.test/p/a"]);
        assert_eq!(products[1].name, "Alpha Cup");
    }

    #[test]
    fn test_stats_and_idempotence() {
        let tree = DomTree::from_html(
            r#"<body>
                <li><a href="https://shop.test/p/1"><img></a><h3>Oak Spoon</h3><b class="price">$3</b></li>
                <li><a href="https://shop.test/p/1"><img></a><h3>Oak Spoon</h3><b class="price">$3</b></li>
                <li><a href="https://shop.test/p/9"><img></a></li>
            </body>"#,
            None,
        )
        .unwrap();
        let extractor = ProductExtractor::default();

        let (first, stats) = extractor.extract_with_stats(&tree);
        let second = extractor.extract(&tree);

        assert_eq!(stats, ExtractionStats { candidates: 3, admitted: 2, kept: 1 });
        assert_eq!(first, second);
    }
}
