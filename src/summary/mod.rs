//! Natural-language summaries of extracted products

pub mod openai;

pub use openai::OpenAiSummarizer;

use crate::error::Result;
use crate::extract::Product;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for one summary call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryRequest {
    /// Page the products were extracted from
    pub url: String,

    /// Newline-joined product lines, see [`format_product_details`]
    pub product_details: String,

    /// Optional focus for the summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl SummaryRequest {
    pub fn new(url: impl Into<String>, products: &[Product]) -> Self {
        Self { url: url.into(), product_details: format_product_details(products), search_term: None }
    }

    /// Builder method: focus the summary on a search term (blank terms are ignored)
    pub fn with_search_term(mut self, term: Option<impl Into<String>>) -> Self {
        self.search_term = term.map(Into::into).filter(|t: &String| !t.trim().is_empty());
        self
    }

    /// Prompt text sent to the model
    pub fn prompt(&self) -> String {
        let mut prompt = String::from(
            "You are an AI assistant designed to provide concise summaries of product offerings from a given website.\n\n\
             Based on the product details extracted from the URL, create a summary that includes the types of \
             products found and their general price ranges.\n",
        );
        if let Some(term) = &self.search_term {
            prompt.push_str(&format!("Focus your summary on products related to the term: \"{}\".\n", term));
        }
        prompt.push_str(&format!("URL: {}\nProduct Details: {}\nSummary:", self.url, self.product_details));
        prompt
    }
}

/// Render products one per line as `Name: .., Price: .., Link: ..`
pub fn format_product_details(products: &[Product]) -> String {
    products.iter().map(Product::details_line).collect::<Vec<_>>().join("\n")
}

/// Produces a short synopsis of a product list
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: SummaryRequest) -> Result<String>;
}
