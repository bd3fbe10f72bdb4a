use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog identifier of a product.
pub type ProductId = u64;

/// Product attributes as the catalog returns them. The cart copies these verbatim
/// and never interprets anything but `id`.
///
/// Display fields the catalog leaves out default to empty; attributes the cart has
/// no field for are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: ProductId, title: impl Into<String>, price: f64, image: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            extra: Map::new(),
        }
    }
}

/// Available quantity of a product. Fetched fresh for every cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockInfo {
    pub id: ProductId,
    pub amount: u32,
}
