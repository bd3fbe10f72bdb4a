//! Test doubles for the cart's collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::app_system::CartSystem;
use crate::cart::CartOptions;
use crate::domain::{Product, ProductId, StockInfo};
use crate::error::{LookupError, StorageError};
use crate::lookup::ProductLookup;
use crate::storage::{CartStorage, MemoryCartStorage};

pub fn product(id: ProductId) -> Product {
    Product::new(id, format!("Sneaker {id}"), 139.9, format!("https://img/{id}.jpg"))
}

/// Catalog backed by a map, counting every call.
#[derive(Default)]
pub struct StubLookup {
    items: Mutex<HashMap<ProductId, (Product, u32)>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl StubLookup {
    pub fn with_stock(stock: &[(ProductId, u32)]) -> Arc<Self> {
        let lookup = Self::default();
        for &(id, amount) in stock {
            lookup.set_stock(id, amount);
        }
        Arc::new(lookup)
    }

    pub fn set_stock(&self, id: ProductId, amount: u32) {
        self.items.lock().unwrap().insert(id, (product(id), amount));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn find(&self, id: ProductId) -> Result<(Product, u32), LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(LookupError::Transport("connection refused".to_string()));
        }
        self.items.lock().unwrap().get(&id).cloned().ok_or(LookupError::NotFound(id))
    }
}

#[async_trait]
impl ProductLookup for StubLookup {
    async fn get_stock(&self, id: ProductId) -> Result<StockInfo, LookupError> {
        let (_, amount) = self.find(id)?;
        Ok(StockInfo { id, amount })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, LookupError> {
        Ok(self.find(id)?.0)
    }
}

/// Memory storage whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStorage {
    pub inner: MemoryCartStorage,
    failing: AtomicBool,
}

impl FlakyStorage {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CartStorage for FlakyStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        self.inner.save(key, blob).await
    }
}

/// Starts a cart over `storage`, seeding it with `blob` first when given.
pub async fn start_cart(
    lookup: Arc<dyn ProductLookup>,
    storage: MemoryCartStorage,
    blob: Option<&str>,
) -> CartSystem {
    let options = CartOptions::default();
    if let Some(blob) = blob {
        storage.save(&options.storage_key, blob).await.unwrap();
    }
    CartSystem::start(options, lookup, Arc::new(storage)).await.unwrap()
}
