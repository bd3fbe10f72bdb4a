//! # Mock Framework
//!
//! Utilities for testing code that talks to a [`ResourceClient`] without running a
//! [`ResourceActor`](crate::actor_framework::ResourceActor).
//!
//! Use [`create_mock_client`] to get a client and the receiving end of its channel,
//! then answer requests by hand with [`next_request`] or [`expect_action`].

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};

/// Creates a client whose requests arrive on the returned receiver.
///
/// The test plays the actor: it reads each request, asserts on it, and replies
/// through its `respond_to` channel with whatever success, failure or delay the
/// scenario needs.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request of any kind. Use when requests may arrive in either order.
pub async fn next_request<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<ResourceRequest<T>> {
    receiver.recv().await
}

/// Verifies that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, oneshot::Sender<Result<T::ActionResult, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{CatalogAction, CatalogActionResult, CatalogClient, CatalogProduct, ProductLookup};

    #[tokio::test]
    async fn test_mock_client() {
        let (inner, mut receiver) = create_mock_client::<CatalogProduct>(10);
        let catalog = CatalogClient::new(inner);

        let stock_task = tokio::spawn(async move { catalog.get_stock(4).await });

        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert_eq!(id, 4);
        assert!(matches!(action, CatalogAction::CheckStock));
        responder.send(Ok(CatalogActionResult::StockLevel(2))).unwrap();

        let stock = stock_task.await.unwrap().unwrap();
        assert_eq!(stock.amount, 2);
    }
}
