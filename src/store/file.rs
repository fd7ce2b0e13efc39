use crate::error::{Result, ScoutError};
use crate::store::{CanonicalProduct, NewCanonicalProduct, ProductStore, SAVE_FAILED};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only JSON Lines file, one canonical product per line
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, canonical: &CanonicalProduct) -> std::io::Result<()> {
        let mut line = serde_json::to_string(canonical)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl ProductStore for JsonFileStore {
    async fn add_canonical_product(&self, product: NewCanonicalProduct) -> Result<String> {
        let canonical = product.into_canonical();

        match self.append(&canonical).await {
            Ok(()) => {
                log::info!("Saved canonical product {} ({})", canonical.id, canonical.link);
                Ok(canonical.id)
            }
            Err(e) => {
                log::error!("Error adding canonical product to {}: {}", self.path.display(), e);
                Err(ScoutError::PersistenceFailed(SAVE_FAILED.to_string()))
            }
        }
    }

    async fn list(&self) -> Result<Vec<CanonicalProduct>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ScoutError::PersistenceFailed(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    ScoutError::PersistenceFailed(format!("{}:{}: {}", self.path.display(), n + 1, e))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Product;

    fn new_product(n: u32) -> NewCanonicalProduct {
        let product = Product::new(format!("Mug {}", n), "$9.99", format!("https://shop.test/p/{}", n));
        NewCanonicalProduct::from_product(&product, "https://shop.test/")
    }

    #[tokio::test]
    async fn test_append_and_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("approved.jsonl"));

        let first = store.add_canonical_product(new_product(1)).await.unwrap();
        let second = store.add_canonical_product(new_product(2)).await.unwrap();
        assert_ne!(first, second);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[1].name, "Mug 2");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("none.jsonl"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_path_is_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing-dir").join("approved.jsonl"));

        let err = store.add_canonical_product(new_product(1)).await.unwrap_err();
        assert!(matches!(err, ScoutError::PersistenceFailed(ref msg) if msg == SAVE_FAILED));
    }
}
