use crate::error::{Result, ScoutError};
use crate::extract::Product;
use crate::store::{NewCanonicalProduct, ProductStore};
use serde::Serialize;

/// One extracted product awaiting review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalItem {
    pub product: Product,
    pub approved: bool,
    /// Id assigned by the store once approved
    pub canonical_id: Option<String>,
}

/// Products extracted from one page, each approvable on its own
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalQueue {
    pub source_url: String,
    pub items: Vec<ApprovalItem>,
}

impl ApprovalQueue {
    pub fn new(source_url: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            source_url: source_url.into(),
            items: products
                .into_iter()
                .map(|product| ApprovalItem { product, approved: false, canonical_id: None })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = (usize, &ApprovalItem)> {
        self.items.iter().enumerate().filter(|(_, item)| !item.approved)
    }

    /// Persist the item at `index` and mark it approved.
    ///
    /// Approving twice returns the existing id without writing again. A failed
    /// write leaves the item unapproved; nothing is retried.
    pub async fn approve(&mut self, store: &dyn ProductStore, index: usize) -> Result<String> {
        let item = self.items.get_mut(index).ok_or(ScoutError::ProductNotFound(index))?;

        if let Some(id) = &item.canonical_id {
            return Ok(id.clone());
        }

        let record = NewCanonicalProduct::from_product(&item.product, self.source_url.clone());
        match store.add_canonical_product(record).await {
            Ok(id) => {
                item.approved = true;
                item.canonical_id = Some(id.clone());
                Ok(id)
            }
            Err(e) => {
                log::error!("Error approving product {}: {}", item.product.link, e);
                Err(e)
            }
        }
    }
}
