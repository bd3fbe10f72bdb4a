//! Product lookup: where the cart learns product details and current stock.

pub mod catalog;
pub mod http;

use async_trait::async_trait;

use crate::domain::{Product, ProductId, StockInfo};
use crate::error::LookupError;

pub use catalog::*;
pub use http::*;

/// Read-only product catalog queried by the cart on every mutation. Implementations
/// must not cache stock.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn get_stock(&self, id: ProductId) -> Result<StockInfo, LookupError>;

    async fn get_product(&self, id: ProductId) -> Result<Product, LookupError>;
}
