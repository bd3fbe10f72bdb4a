use thiserror::Error;

use crate::domain::ProductId;

/// Failures talking to the product catalog.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),
    #[error("Catalog returned HTTP {status} for {url}")]
    Http { status: u16, url: String },
    #[error("Catalog transport error: {0}")]
    Transport(String),
    #[error("Malformed catalog response: {0}")]
    Malformed(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Failures reading or writing the persisted cart blob.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Cart serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Why a cart operation failed, carried inside the per-operation error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FailureCause {
    #[error("product {0} is not in the cart")]
    ProductNotInCart(ProductId),
    #[error("lookup failed: {0}")]
    LookupFailed(#[from] LookupError),
    #[error("persist failed: {0}")]
    PersistFailed(#[from] StorageError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Out of stock: product {product_id} requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },
    #[error("Error adding product: {0}")]
    AddProductFailed(FailureCause),
    #[error("Error removing product: {0}")]
    RemoveProductFailed(FailureCause),
    #[error("Error updating product amount: {0}")]
    UpdateAmountFailed(FailureCause),
    #[error("Stored cart is corrupt: {0}")]
    CorruptStorage(String),
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
    #[error("Invalid cart options: {0}")]
    InvalidOptions(String),
}

impl CartError {
    /// Short notification text for the shopper. Causes stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            CartError::OutOfStock { .. } => "Requested quantity out of stock",
            CartError::AddProductFailed(_) => "Error adding product",
            CartError::RemoveProductFailed(_) => "Error removing product",
            CartError::UpdateAmountFailed(_) => "Error updating product amount",
            CartError::CorruptStorage(_) | CartError::Storage(_) => "Could not restore the saved cart",
            CartError::ActorCommunicationError(_) | CartError::InvalidOptions(_) => "Cart is unavailable",
        }
    }

    /// The underlying cause of a failed add/remove/update, if any.
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            CartError::AddProductFailed(cause)
            | CartError::RemoveProductFailed(cause)
            | CartError::UpdateAmountFailed(cause) => Some(cause),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
