//! Calling workflows around the extractor
//!
//! URL in, products (and optionally a summary) out, plus the approval flow
//! that copies reviewed products into a [`ProductStore`].

pub mod approval;
pub mod loader;

pub use approval::{ApprovalItem, ApprovalQueue};
pub use loader::{ChromePageLoader, PageLoader, StaticPageLoader};

use crate::error::{Result, ScoutError};
use crate::extract::{Product, ProductExtractor};
use crate::store::{MemoryStore, NewCanonicalProduct, ProductStore};
use crate::summary::{SummaryRequest, Summarizer};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Message returned for input that is not an absolute http(s) URL
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL.";

/// Summary used when a page yields no products; the summarizer is not called
pub const NO_PRODUCTS_SUMMARY: &str =
    "No products found at the provided URL or the page structure is not recognized.";

/// Validate user input as an absolute http(s) URL
pub fn validate_url(input: &str) -> Result<Url> {
    let invalid = || ScoutError::InvalidUrl(INVALID_URL_MESSAGE.to_string());

    let url = Url::parse(input.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    Ok(url)
}

/// Result of loading and extracting one page
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The page loaded; the list may be empty
    Products(Vec<Product>),
    /// The page could not be loaded
    NavigationFailed(String),
}

impl ExtractionOutcome {
    pub fn products(&self) -> &[Product] {
        match self {
            ExtractionOutcome::Products(products) => products,
            ExtractionOutcome::NavigationFailed(_) => &[],
        }
    }

    /// Collapse navigation failure into an empty list
    pub fn into_products(self) -> Vec<Product> {
        match self {
            ExtractionOutcome::Products(products) => products,
            ExtractionOutcome::NavigationFailed(_) => Vec::new(),
        }
    }

    pub fn is_navigation_failure(&self) -> bool {
        matches!(self, ExtractionOutcome::NavigationFailed(_))
    }
}

/// Products and summary for one URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub url: String,
    pub products: Vec<Product>,
    /// `None` when no summarizer is configured
    pub summary: Option<String>,
    /// Whether the page failed to load (products are then empty)
    pub navigation_failed: bool,
}

/// Load a page and run the extractor on it. Load errors never propagate.
pub async fn extract_products_from_url(
    loader: &dyn PageLoader,
    extractor: &ProductExtractor,
    url: &Url,
) -> ExtractionOutcome {
    match loader.load(url).await {
        Ok(tree) => ExtractionOutcome::Products(extractor.extract(&tree)),
        Err(e) => {
            log::warn!("Error during scraping {}: {}", url, e);
            ExtractionOutcome::NavigationFailed(e.to_string())
        }
    }
}

/// Entry point bundling the collaborators
#[derive(Clone)]
pub struct Scout {
    loader: Arc<dyn PageLoader>,
    summarizer: Option<Arc<dyn Summarizer>>,
    store: Arc<dyn ProductStore>,
    extractor: ProductExtractor,
}

impl Scout {
    /// Create with an in-memory store and no summarizer
    pub fn new(loader: Arc<dyn PageLoader>) -> Self {
        Self { loader, summarizer: None, store: Arc::new(MemoryStore::new()), extractor: ProductExtractor::default() }
    }

    /// Builder method: summarizer
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Builder method: product store
    pub fn with_store(mut self, store: Arc<dyn ProductStore>) -> Self {
        self.store = store;
        self
    }

    /// Builder method: extractor
    pub fn with_extractor(mut self, extractor: ProductExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn store(&self) -> &dyn ProductStore {
        self.store.as_ref()
    }

    pub fn has_summarizer(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Validate the URL, then load and extract. Only validation errors are returned.
    pub async fn extract(&self, url: &str) -> Result<ExtractionOutcome> {
        let url = validate_url(url)?;
        Ok(extract_products_from_url(self.loader.as_ref(), &self.extractor, &url).await)
    }

    /// Extract products and summarize them.
    ///
    /// Empty pages and failed loads both get [`NO_PRODUCTS_SUMMARY`] without a
    /// summarizer call; `navigation_failed` tells them apart.
    pub async fn fetch_products_and_summary(&self, url: &str, search_term: Option<&str>) -> Result<SearchReport> {
        let validated = validate_url(url)?;
        let outcome = extract_products_from_url(self.loader.as_ref(), &self.extractor, &validated).await;
        let navigation_failed = outcome.is_navigation_failure();
        let products = outcome.into_products();

        if products.is_empty() {
            return Ok(SearchReport {
                url: validated.to_string(),
                products,
                summary: Some(NO_PRODUCTS_SUMMARY.to_string()),
                navigation_failed,
            });
        }

        let summary = match &self.summarizer {
            Some(summarizer) => {
                let request = SummaryRequest::new(validated.as_str(), &products).with_search_term(search_term);
                Some(summarizer.summarize(request).await?)
            }
            None => None,
        };

        Ok(SearchReport { url: validated.to_string(), products, summary, navigation_failed })
    }

    /// Summarize an already extracted product list
    pub async fn summarize(&self, url: &str, products: &[Product], search_term: Option<&str>) -> Result<String> {
        let summarizer = self
            .summarizer
            .as_ref()
            .ok_or_else(|| ScoutError::SummaryFailed("No summarizer configured".to_string()))?;
        summarizer.summarize(SummaryRequest::new(url, products).with_search_term(search_term)).await
    }

    /// Extract products from a page into an approval queue.
    ///
    /// A failed load yields an empty queue, same as a page without products.
    pub async fn products_for_approval(&self, url: &str) -> Result<ApprovalQueue> {
        let validated = validate_url(url)?;
        let products = extract_products_from_url(self.loader.as_ref(), &self.extractor, &validated)
            .await
            .into_products();
        Ok(ApprovalQueue::new(validated.to_string(), products))
    }

    /// Approve one queued product
    pub async fn approve(&self, queue: &mut ApprovalQueue, index: usize) -> Result<String> {
        queue.approve(self.store.as_ref(), index).await
    }

    /// Approve a product directly, without a queue
    pub async fn approve_product(&self, product: &Product, source_url: &str) -> Result<String> {
        let record = NewCanonicalProduct::from_product(product, source_url);
        self.store.add_canonical_product(record).await.inspect_err(|e| {
            log::error!("Error approving product {}: {}", product.link, e);
        })
    }
}
