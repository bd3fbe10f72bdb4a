use tokio::sync::oneshot;

use crate::domain::{Cart, ProductId};
use crate::error::CartError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requests served by the cart service. Each carries a oneshot channel for the reply.
#[derive(Debug)]
pub enum CartRequest {
    AddProduct {
        product_id: ProductId,
        respond_to: ServiceResponse<(), CartError>,
    },
    RemoveProduct {
        product_id: ProductId,
        respond_to: ServiceResponse<(), CartError>,
    },
    /// `amount` is signed: non-positive values are accepted and ignored.
    UpdateProductAmount {
        product_id: ProductId,
        amount: i64,
        respond_to: ServiceResponse<(), CartError>,
    },
    GetCart {
        respond_to: ServiceResponse<Cart, CartError>,
    },
    Shutdown,
}
