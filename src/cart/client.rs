use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument};

use crate::domain::{Cart, ProductId};
use crate::error::CartError;
use crate::messages::CartRequest;

/// Generates a client method that sends a request with a oneshot reply channel and
/// awaits the answer, with a tracing span per call.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                debug!("Sending request");
                let (respond_to, response) = oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

/// Handle to a running cart. Cheap to clone; hand one to every consumer that reads
/// or changes the cart.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
    snapshot: watch::Receiver<Cart>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>, snapshot: watch::Receiver<Cart>) -> Self {
        Self { sender, snapshot }
    }

    /// The last committed cart.
    pub fn cart(&self) -> Cart {
        self.snapshot.borrow().clone()
    }

    /// A receiver that is notified after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.snapshot.clone()
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending request");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(CartClient => fn add_product(product_id: ProductId) -> () as CartRequest::AddProduct, Error = CartError);
client_method!(CartClient => fn remove_product(product_id: ProductId) -> () as CartRequest::RemoveProduct, Error = CartError);
client_method!(CartClient => fn update_product_amount(product_id: ProductId, amount: i64) -> () as CartRequest::UpdateProductAmount, Error = CartError);
client_method!(CartClient => fn fetch_cart() -> Cart as CartRequest::GetCart, Error = CartError);
