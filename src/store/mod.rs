//! Persistence of approved ("canonical") products

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::extract::Product;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An approved product as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProduct {
    pub id: String,
    pub name: String,
    pub price: String,
    pub link: String,
    /// Page the product was extracted from
    pub source_url: String,
    pub approved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A product about to be approved; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCanonicalProduct {
    pub name: String,
    pub price: String,
    pub link: String,
    pub source_url: String,
}

impl NewCanonicalProduct {
    pub fn from_product(product: &Product, source_url: impl Into<String>) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.clone(),
            link: product.link.clone(),
            source_url: source_url.into(),
        }
    }

    /// Stamp with a fresh id and the current time
    pub fn into_canonical(self) -> CanonicalProduct {
        let now = Utc::now();
        CanonicalProduct {
            id: generate_id(),
            name: self.name,
            price: self.price,
            link: self.link,
            source_url: self.source_url,
            approved_at: now,
            created_at: now,
        }
    }
}

/// Random 16 hex digit record id
pub fn generate_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

/// Message shown to callers when a write fails
pub const SAVE_FAILED: &str = "Failed to save approved product.";

/// Storage for approved products
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist one approved product and return its generated id
    async fn add_canonical_product(&self, product: NewCanonicalProduct) -> Result<String>;

    /// All stored products in insertion order
    async fn list(&self) -> Result<Vec<CanonicalProduct>>;
}
