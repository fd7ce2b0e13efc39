use crate::error::{Result, ScoutError};
use crate::store::{CanonicalProduct, NewCanonicalProduct, ProductStore, SAVE_FAILED};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// In-process store, mainly for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: Mutex<Vec<CanonicalProduct>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, to exercise error paths
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn add_canonical_product(&self, product: NewCanonicalProduct) -> Result<String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            log::error!("Error adding canonical product {}: writes disabled", product.link);
            return Err(ScoutError::PersistenceFailed(SAVE_FAILED.to_string()));
        }

        let canonical = product.into_canonical();
        let id = canonical.id.clone();
        self.products.lock().await.push(canonical);
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<CanonicalProduct>> {
        Ok(self.products.lock().await.clone())
    }
}
