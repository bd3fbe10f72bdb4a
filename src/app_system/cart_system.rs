use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cart::{CartClient, CartOptions, CartService};
use crate::error::CartError;
use crate::lookup::ProductLookup;
use crate::storage::CartStorage;

/// Starts the cart service, hands out its client and handles shutdown.
pub struct CartSystem {
    pub cart_client: CartClient,
    handle: JoinHandle<()>,
}

impl CartSystem {
    pub async fn start(
        options: CartOptions,
        lookup: Arc<dyn ProductLookup>,
        storage: Arc<dyn CartStorage>,
    ) -> Result<Self, CartError> {
        info!(storage_key = %options.storage_key, "Starting cart system");
        let (service, cart_client) = CartService::new(options, lookup, storage).await?;
        let handle = tokio::spawn(service.run());
        Ok(Self { cart_client, handle })
    }

    /// Stops the service even if other clones of the client are still alive.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down cart system...");
        if self.cart_client.shutdown().await.is_err() {
            info!("Cart service already stopped");
        }
        drop(self.cart_client);

        if let Err(e) = self.handle.await {
            error!("Cart service task failed: {:?}", e);
            return Err(format!("Cart service task failed: {:?}", e));
        }

        info!("Cart system shutdown complete.");
        Ok(())
    }
}
