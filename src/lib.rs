//! # product-scout
//!
//! Finds product listings (name, price, link) on arbitrary e-commerce pages rendered in
//! headless Chrome, using structural heuristics instead of per-site selectors.
//!
//! ## Features
//!
//! - **Product Extractor**: image-bearing links are resolved to their enclosing "card",
//!   then name and price are picked by ordered matcher cascades and deduplicated
//! - **Page Loading**: headless Chrome via the Chrome DevTools Protocol, or static HTML
//! - **Summaries**: optional natural-language synopsis through an OpenAI-compatible API
//! - **Approval Workflow**: copy reviewed products into a persisted canonical catalog
//! - **MCP Server**: the same workflows exposed as Model Context Protocol tools
//!
//! ## Running
//!
//! ```bash
//! # One-off extraction
//! cargo run --bin product-scout -- extract https://shop.example.com/category/mugs
//!
//! # MCP server over stdio
//! cargo run --features mcp-server --bin mcp-server
//! ```
//!
//! ## Library Usage
//!
//! ### Extracting from a live page
//!
//! ```rust,no_run
//! use product_scout::{ChromePageLoader, LaunchOptions, Scout};
//! use std::sync::Arc;
//!
//! # async fn run() -> product_scout::Result<()> {
//! let scout = Scout::new(Arc::new(ChromePageLoader::new(LaunchOptions::default())));
//!
//! let outcome = scout.extract("https://shop.example.com/category/mugs").await?;
//! for product in outcome.products() {
//!     println!("{}", product.details_line());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Extracting from markup
//!
//! ```rust
//! use product_scout::{DomTree, extract};
//!
//! let html = r#"<body><article>
//!     <a href="/p/1"><img src="mug.jpg"></a>
//!     <h3>Red Mug</h3><span class="price">$9.99</span>
//! </article></body>"#;
//!
//! let tree = DomTree::from_html(html, Some("https://shop.example.com/")).unwrap();
//! let products = extract(&tree);
//!
//! assert_eq!(products.len(), 1);
//! assert_eq!(products[0].link, "https://shop.example.com/p/1");
//! ```
//!
//! ## Module Overview
//!
//! - [`extract`]: the product extractor (candidates, card roots, field cascades, dedup)
//! - [`dom`]: DOM snapshot model and document-order index
//! - [`browser`]: Chrome session management and configuration
//! - [`pipeline`]: URL validation, page loaders, summary and approval workflows
//! - [`summary`]: summarizer trait and OpenAI-compatible client
//! - [`store`]: persistence of approved products
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod store;
pub mod summary;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use dom::{BoundingBox, DomIndex, DomTree, ElementNode};
pub use error::{Result, ScoutError};
pub use extract::{ExtractorConfig, Product, ProductExtractor, extract};
pub use pipeline::{
    ApprovalQueue, ChromePageLoader, ExtractionOutcome, PageLoader, Scout, SearchReport, StaticPageLoader,
    validate_url,
};
pub use store::{CanonicalProduct, JsonFileStore, MemoryStore, ProductStore};
pub use summary::{OpenAiSummarizer, Summarizer, SummaryRequest, format_product_details};

#[cfg(feature = "mcp-handler")]
pub use mcp::ProductServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
