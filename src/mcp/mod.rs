//! MCP (Model Context Protocol) server implementation for product extraction
//!
//! Each tool validates its input, runs the matching [`Scout`](crate::pipeline::Scout)
//! workflow and returns pretty-printed JSON.

pub mod handler;
pub use handler::ProductServer;

use crate::error::ScoutError;
use crate::extract::Product;
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Extract products parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractProductsParams {
    /// Absolute http(s) URL of the page to scan
    pub url: String,
    /// Also summarise the products found (default: false)
    #[serde(default)]
    pub summarize: bool,
    /// Optional term the summary should focus on
    #[serde(default)]
    pub search_term: Option<String>,
}

/// Summarize products parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummarizeProductsParams {
    /// Page the products came from
    pub url: String,
    /// Products to summarise
    pub products: Vec<Product>,
    /// Optional term the summary should focus on
    #[serde(default)]
    pub search_term: Option<String>,
}

/// Approve product parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApproveProductParams {
    /// The product to save, as returned by extract_products
    pub product: Product,
    /// Page the product was extracted from
    pub source_url: String,
}

/// Map library errors onto MCP errors; bad input is the caller's fault
fn to_mcp_error(err: ScoutError) -> McpError {
    match err {
        ScoutError::InvalidUrl(msg) => McpError::invalid_params(msg, None),
        ScoutError::ProductNotFound(_) => McpError::invalid_params(err.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl ProductServer {
    /// Extract products from a page
    #[tool(description = "Load a web page and extract product listings (name, price, link), optionally with a summary")]
    async fn extract_products(
        &self,
        Parameters(params): Parameters<ExtractProductsParams>,
    ) -> Result<CallToolResult, McpError> {
        let scout = self.scout();

        if params.summarize {
            if !scout.has_summarizer() {
                return Err(McpError::invalid_params("Summaries are not configured on this server", None));
            }
            let report = scout
                .fetch_products_and_summary(&params.url, params.search_term.as_deref())
                .await
                .map_err(to_mcp_error)?;
            return json_result(&report);
        }

        let outcome = scout.extract(&params.url).await.map_err(to_mcp_error)?;
        let navigation_failed = outcome.is_navigation_failure();
        json_result(&serde_json::json!({
            "url": params.url,
            "navigation_failed": navigation_failed,
            "products": outcome.into_products(),
        }))
    }

    /// Summarize a product list
    #[tool(description = "Summarise a list of products: product types and general price ranges")]
    async fn summarize_products(
        &self,
        Parameters(params): Parameters<SummarizeProductsParams>,
    ) -> Result<CallToolResult, McpError> {
        let summary = self
            .scout()
            .summarize(&params.url, &params.products, params.search_term.as_deref())
            .await
            .map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(summary)]))
    }

    /// Approve a product into the catalog
    #[tool(description = "Save a reviewed product to the canonical product catalog and return its id")]
    async fn approve_product(
        &self,
        Parameters(params): Parameters<ApproveProductParams>,
    ) -> Result<CallToolResult, McpError> {
        crate::pipeline::validate_url(&params.source_url).map_err(to_mcp_error)?;
        let id = self
            .scout()
            .approve_product(&params.product, &params.source_url)
            .await
            .map_err(to_mcp_error)?;
        json_result(&serde_json::json!({ "id": id }))
    }

    /// List approved products
    #[tool(description = "List all products saved to the canonical catalog")]
    async fn list_approved_products(&self) -> Result<CallToolResult, McpError> {
        let products = self.scout().store().list().await.map_err(to_mcp_error)?;
        json_result(&products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Scout, StaticPageLoader};
    use std::sync::Arc;

    fn server() -> ProductServer {
        let loader = StaticPageLoader::new().with_page(
            "https://shop.test/",
            r#"<body><li><a href="/p/1"><img></a><h3>Red Mug</h3><span class="price">$9.99</span></li></body>"#,
        );
        ProductServer::new(Scout::new(Arc::new(loader)))
    }

    fn text_of(result: &CallToolResult) -> String {
        result.content[0].as_text().map(|t| t.text.clone()).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_extract_products_tool() {
        let server = server();
        let params = ExtractProductsParams { url: "https://shop.test/".into(), summarize: false, search_term: None };

        let result = server.extract_products(Parameters(params)).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();

        assert_eq!(value["navigation_failed"], false);
        assert_eq!(value["products"][0]["name"], "Red Mug");
        assert_eq!(value["products"][0]["link"], "https://shop.test/p/1");
    }

    #[tokio::test]
    async fn test_extract_products_rejects_invalid_url() {
        let params = ExtractProductsParams { url: "shop".into(), summarize: false, search_term: None };
        assert!(server().extract_products(Parameters(params)).await.is_err());
    }

    #[tokio::test]
    async fn test_summary_requires_summarizer() {
        let params = ExtractProductsParams { url: "https://shop.test/".into(), summarize: true, search_term: None };
        assert!(server().extract_products(Parameters(params)).await.is_err());
    }

    #[tokio::test]
    async fn test_approve_then_list() {
        let server = server();
        let params = ApproveProductParams {
            product: Product::new("Red Mug", "$9.99", "https://shop.test/p/1"),
            source_url: "https://shop.test/".into(),
        };

        server.approve_product(Parameters(params)).await.unwrap();
        let listed = server.list_approved_products().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text_of(&listed)).unwrap();

        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["sourceUrl"], "https://shop.test/");
    }
}
