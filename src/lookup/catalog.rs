use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::ProductLookup;
use crate::actor_framework::{Entity, FrameworkError, ResourceActor, ResourceClient};
use crate::domain::{Product, ProductId, StockInfo};
use crate::error::LookupError;

/// A catalog record: the product plus its warehouse stock.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    pub product: Product,
    pub stock: u32,
}

#[derive(Debug, Clone)]
pub struct CatalogProductCreate {
    pub title: String,
    pub price: f64,
    pub image: String,
    pub stock: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogProductPatch {
    pub stock: Option<u32>,
}

/// Custom actions on catalog records.
#[derive(Debug, Clone)]
pub enum CatalogAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
}

#[derive(Debug, Clone)]
pub enum CatalogActionResult {
    StockLevel(u32),
}

impl Entity for CatalogProduct {
    type Id = ProductId;
    type CreatePayload = CatalogProductCreate;
    type Patch = CatalogProductPatch;
    type Action = CatalogAction;
    type ActionResult = CatalogActionResult;

    fn from_create(id: ProductId, payload: CatalogProductCreate) -> Result<Self, String> {
        Ok(Self {
            product: Product::new(id, payload.title, payload.price, payload.image),
            stock: payload.stock,
        })
    }

    fn on_create(&mut self) -> Result<(), String> {
        if self.product.title.trim().is_empty() {
            return Err("Product title must not be empty".to_string());
        }
        if self.product.price.is_nan() || self.product.price < 0.0 {
            return Err(format!("Invalid price: {}", self.product.price));
        }
        Ok(())
    }

    fn on_update(&mut self, patch: CatalogProductPatch) -> Result<(), String> {
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        Ok(())
    }

    fn handle_action(&mut self, action: CatalogAction) -> Result<CatalogActionResult, String> {
        match action {
            CatalogAction::CheckStock => Ok(CatalogActionResult::StockLevel(self.stock)),
        }
    }
}

/// Starts an in-process catalog with ids assigned from 1 upward.
pub fn spawn_catalog(buffer_size: usize) -> Result<(CatalogClient, JoinHandle<()>), FrameworkError> {
    let counter = Arc::new(AtomicU64::new(1));
    let next_id = move || counter.fetch_add(1, Ordering::SeqCst);

    let (actor, inner) = ResourceActor::<CatalogProduct>::new(buffer_size, next_id)?;
    let handle = tokio::spawn(actor.run());
    Ok((CatalogClient::new(inner), handle))
}

fn lookup_error(id: ProductId, e: FrameworkError) -> LookupError {
    match e {
        FrameworkError::NotFound(_) => LookupError::NotFound(id),
        other => LookupError::ActorCommunicationError(other.to_string()),
    }
}

/// Client for the in-process catalog actor.
#[derive(Clone)]
pub struct CatalogClient {
    inner: ResourceClient<CatalogProduct>,
}

impl CatalogClient {
    pub fn new(inner: ResourceClient<CatalogProduct>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, payload: CatalogProductCreate) -> Result<ProductId, FrameworkError> {
        debug!("Sending request");
        self.inner.create(payload).await
    }

    /// Changes warehouse stock. Carts notice on their next mutation.
    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: ProductId, stock: u32) -> Result<(), FrameworkError> {
        debug!("Sending request");
        let patch = CatalogProductPatch { stock: Some(stock) };
        self.inner.update(id, patch).await.map(|_| ())
    }
}

#[async_trait]
impl ProductLookup for CatalogClient {
    #[instrument(skip(self))]
    async fn get_stock(&self, id: ProductId) -> Result<StockInfo, LookupError> {
        debug!("Sending request");
        match self.inner.perform_action(id, CatalogAction::CheckStock).await {
            Ok(CatalogActionResult::StockLevel(amount)) => Ok(StockInfo { id, amount }),
            Err(e) => Err(lookup_error(id, e)),
        }
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Product, LookupError> {
        debug!("Sending request");
        match self.inner.get(id).await {
            Ok(Some(item)) => Ok(item.product),
            Ok(None) => Err(LookupError::NotFound(id)),
            Err(e) => Err(lookup_error(id, e)),
        }
    }
}
