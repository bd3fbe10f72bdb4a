//! # Cart Store
//!
//! Shopping-cart state for a storefront: the products in the cart, persisted across
//! sessions, changed only through stock-checked operations.
//!
//! ## Ingredients
//!
//! - **Domain types** - [`Product`], [`CartEntry`], [`Cart`], [`StockInfo`]
//! - **Collaborators** - [`ProductLookup`] (catalog: details and stock) and
//!   [`CartStorage`] (one serialized cart under a fixed key)
//! - **Cart service** - [`CartService`] owns the cart and serves [`CartRequest`]s
//!   one at a time; [`CartClient`] is the handle consumers are given
//! - **System** - [`CartSystem`] wires it together; [`setup_tracing`] configures logs
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let storage = Arc::new(FileCartStorage::new(".cart").await?);
//! let lookup = Arc::new(HttpProductLookup::new("http://localhost:3333", timeout)?);
//! let system = CartSystem::start(CartOptions::default(), lookup, storage).await?;
//!
//! system.cart_client.add_product(1).await?;
//! system.cart_client.update_product_amount(1, 3).await?;
//! println!("{} items", system.cart_client.cart().total_items());
//!
//! system.shutdown().await?;
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod cart;
pub mod config;
pub mod domain;
pub mod error;
pub mod lookup;
pub mod messages;
pub mod storage;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod test_support;

pub use app_system::{setup_tracing, CartSystem};
pub use cart::{CartClient, CartOptions, CartService, CorruptCartPolicy, DEFAULT_STORAGE_KEY};
pub use config::CartConfig;
pub use domain::{Cart, CartEntry, Product, ProductId, StockInfo};
pub use error::{CartError, ConfigError, FailureCause, LookupError, StorageError};
pub use lookup::{spawn_catalog, CatalogClient, CatalogProductCreate, HttpProductLookup, ProductLookup};
pub use messages::CartRequest;
pub use storage::{CartStorage, FileCartStorage, MemoryCartStorage};
