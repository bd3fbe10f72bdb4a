//! Durable key-value storage for the serialized cart.
//!
//! The blob is a JSON array of flat cart entries, the same shape a browser storefront
//! keeps under `@RocketShoes:cart`.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::domain::Cart;
use crate::error::StorageError;

pub use file::FileCartStorage;
pub use memory::MemoryCartStorage;

#[async_trait]
pub trait CartStorage: Send + Sync {
    /// `None` when nothing was ever saved under `key`.
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError>;
}

pub fn encode_cart(cart: &Cart) -> Result<String, StorageError> {
    Ok(serde_json::to_string(cart)?)
}

/// Parses a stored blob and checks the cart invariants.
pub fn decode_cart(blob: &str) -> Result<Cart, StorageError> {
    let cart: Cart = serde_json::from_str(blob)?;
    cart.validate().map_err(StorageError::Serialization)?;
    Ok(cart)
}
