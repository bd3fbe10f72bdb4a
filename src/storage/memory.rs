use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CartStorage;
use crate::error::StorageError;

/// In-memory key-value store. Clones share the same map, so a second cart built
/// over a clone sees what the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw blob under `key`, for inspection.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).cloned()
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key).await)
    }

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.inner.write().await.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
