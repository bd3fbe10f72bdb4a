use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

use super::client::CartClient;
use crate::domain::{Cart, CartEntry, ProductId};
use crate::error::{CartError, FailureCause, LookupError, StorageError};
use crate::lookup::ProductLookup;
use crate::messages::CartRequest;
use crate::storage::{decode_cart, encode_cart, CartStorage};

pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// What to do when the stored cart cannot be parsed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptCartPolicy {
    /// Refuse to start with [`CartError::CorruptStorage`].
    #[default]
    Fail,
    /// Log a warning and start with an empty cart. The bad blob is overwritten by the
    /// next successful mutation.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartOptions {
    pub buffer_size: usize,
    pub storage_key: String,
    pub corrupt_policy: CorruptCartPolicy,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            corrupt_policy: CorruptCartPolicy::default(),
        }
    }
}

/// Owns the cart. Requests are served one at a time, so a mutation always starts
/// from the cart the previous one committed.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    lookup: Arc<dyn ProductLookup>,
    storage: Arc<dyn CartStorage>,
    storage_key: String,
    cart: Cart,
    snapshot: watch::Sender<Cart>,
}

impl CartService {
    /// Restores the cart from storage and returns the service together with its client.
    pub async fn new(
        options: CartOptions,
        lookup: Arc<dyn ProductLookup>,
        storage: Arc<dyn CartStorage>,
    ) -> Result<(Self, CartClient), CartError> {
        if options.buffer_size == 0 {
            return Err(CartError::InvalidOptions("buffer_size must be at least 1".to_string()));
        }
        let cart = restore_cart(storage.as_ref(), &options.storage_key, options.corrupt_policy).await?;

        let (sender, receiver) = mpsc::channel(options.buffer_size);
        let (snapshot, snapshot_rx) = watch::channel(cart.clone());
        let service = Self {
            receiver,
            lookup,
            storage,
            storage_key: options.storage_key,
            cart,
            snapshot,
        };
        Ok((service, CartClient::new(sender, snapshot_rx)))
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!(entries = self.cart.len(), "CartService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::AddProduct { product_id, respond_to } => {
                    let result = self.handle_add_product(product_id).await;
                    report("add_product", product_id, &result);
                    let _ = respond_to.send(result);
                }
                CartRequest::RemoveProduct { product_id, respond_to } => {
                    let result = self.handle_remove_product(product_id).await;
                    report("remove_product", product_id, &result);
                    let _ = respond_to.send(result);
                }
                CartRequest::UpdateProductAmount { product_id, amount, respond_to } => {
                    let result = self.handle_update_product_amount(product_id, amount).await;
                    report("update_product_amount", product_id, &result);
                    let _ = respond_to.send(result);
                }
                CartRequest::GetCart { respond_to } => {
                    let _ = respond_to.send(Ok(self.cart.clone()));
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }
        info!("CartService stopped");
    }

    #[instrument(skip(self))]
    async fn handle_add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        debug!("Processing add_product request");
        let add_failed = |e: LookupError| CartError::AddProductFailed(FailureCause::LookupFailed(e));

        let next = match self.cart.get(product_id).map(|entry| entry.amount) {
            Some(current) => {
                let stock = self.lookup.get_stock(product_id).await.map_err(add_failed)?;
                if current >= stock.amount {
                    return Err(CartError::OutOfStock {
                        product_id,
                        requested: u64::from(current) + 1,
                        available: stock.amount,
                    });
                }
                self.cart
                    .with_amount(product_id, current + 1)
                    .ok_or(CartError::AddProductFailed(FailureCause::ProductNotInCart(product_id)))?
            }
            None => {
                let (stock, product) = tokio::try_join!(
                    self.lookup.get_stock(product_id),
                    self.lookup.get_product(product_id)
                )
                .map_err(add_failed)?;
                if product.id != product_id {
                    return Err(add_failed(LookupError::Malformed(format!(
                        "requested product {}, catalog returned {}",
                        product_id, product.id
                    ))));
                }
                if stock.amount == 0 {
                    return Err(CartError::OutOfStock { product_id, requested: 1, available: 0 });
                }
                self.cart.with_appended(CartEntry::new(product))
            }
        };

        self.commit(next)
            .await
            .map_err(|e| CartError::AddProductFailed(FailureCause::PersistFailed(e)))
    }

    #[instrument(skip(self))]
    async fn handle_remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        debug!("Processing remove_product request");
        let next = self
            .cart
            .without(product_id)
            .ok_or(CartError::RemoveProductFailed(FailureCause::ProductNotInCart(product_id)))?;

        self.commit(next)
            .await
            .map_err(|e| CartError::RemoveProductFailed(FailureCause::PersistFailed(e)))
    }

    #[instrument(skip(self))]
    async fn handle_update_product_amount(&mut self, product_id: ProductId, amount: i64) -> Result<(), CartError> {
        debug!("Processing update_product_amount request");
        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(());
        }
        // positive from here on
        let requested = amount as u64;

        let stock = self
            .lookup
            .get_stock(product_id)
            .await
            .map_err(|e| CartError::UpdateAmountFailed(FailureCause::LookupFailed(e)))?;
        if requested > u64::from(stock.amount) {
            return Err(CartError::OutOfStock { product_id, requested, available: stock.amount });
        }

        // bounded by stock.amount, which is a u32
        let next = self
            .cart
            .with_amount(product_id, requested as u32)
            .ok_or(CartError::UpdateAmountFailed(FailureCause::ProductNotInCart(product_id)))?;

        self.commit(next)
            .await
            .map_err(|e| CartError::UpdateAmountFailed(FailureCause::PersistFailed(e)))
    }

    /// Persists `next`, then adopts it. On a storage failure the in-memory cart keeps
    /// its previous value.
    async fn commit(&mut self, next: Cart) -> Result<(), StorageError> {
        let blob = encode_cart(&next)?;
        self.storage.save(&self.storage_key, &blob).await?;

        self.cart = next;
        self.snapshot.send_replace(self.cart.clone());
        info!(entries = self.cart.len(), total_items = self.cart.total_items(), "Cart saved");
        Ok(())
    }
}

async fn restore_cart(
    storage: &dyn CartStorage,
    key: &str,
    policy: CorruptCartPolicy,
) -> Result<Cart, CartError> {
    let Some(blob) = storage.load(key).await? else {
        info!(key, "No stored cart, starting empty");
        return Ok(Cart::new());
    };

    match decode_cart(&blob) {
        Ok(cart) => {
            info!(key, entries = cart.len(), "Restored cart from storage");
            Ok(cart)
        }
        Err(e) => match policy {
            CorruptCartPolicy::Fail => {
                error!(key, error = %e, "Stored cart is corrupt");
                Err(CartError::CorruptStorage(e.to_string()))
            }
            CorruptCartPolicy::Reset => {
                warn!(key, error = %e, "Stored cart is corrupt, starting empty");
                Ok(Cart::new())
            }
        },
    }
}

fn report(operation: &'static str, product_id: ProductId, result: &Result<(), CartError>) {
    match result {
        Ok(()) => debug!(operation, product_id, "Request completed"),
        Err(e @ CartError::OutOfStock { .. }) => {
            warn!(operation, product_id, error = %e, notice = e.user_message(), "Request rejected")
        }
        Err(e) if matches!(e.cause(), Some(FailureCause::ProductNotInCart(_))) => {
            warn!(operation, product_id, error = %e, notice = e.user_message(), "Request rejected")
        }
        Err(e) => error!(operation, product_id, error = %e, notice = e.user_message(), "Request failed"),
    }
}
