use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::ProductLookup;
use crate::domain::{Product, ProductId, StockInfo};
use crate::error::LookupError;

/// REST catalog client: `GET {base}/stock/{id}` and `GET {base}/products/{id}`.
#[derive(Clone)]
pub struct HttpProductLookup {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct StockBody {
    amount: u32,
}

impl HttpProductLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str, id: ProductId) -> Result<T, LookupError> {
        let url = format!("{}/{}/{}", self.base_url, resource, id);
        debug!(%url, "Fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(id));
        }
        if !status.is_success() {
            return Err(LookupError::Http { status: status.as_u16(), url });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ProductLookup for HttpProductLookup {
    #[instrument(skip(self))]
    async fn get_stock(&self, id: ProductId) -> Result<StockInfo, LookupError> {
        let body: StockBody = self.get_json("stock", id).await?;
        Ok(StockInfo { id, amount: body.amount })
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Product, LookupError> {
        let product: Product = self.get_json("products", id).await?;
        if product.id != id {
            return Err(LookupError::Malformed(format!(
                "requested product {}, catalog returned {}",
                id, product.id
            )));
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    async fn stock(Path(id): Path<u64>) -> Result<Json<Value>, AxumStatus> {
        match id {
            1 => Ok(Json(json!({ "id": 1, "amount": 3 }))),
            2 => Ok(Json(json!({ "id": 2, "amount": "plenty" }))),
            3 => Err(AxumStatus::SERVICE_UNAVAILABLE),
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn product(Path(id): Path<u64>) -> Result<Json<Value>, AxumStatus> {
        match id {
            1 => Ok(Json(json!({
                "id": 1,
                "title": "Tenis de Caminhada",
                "price": 179.9,
                "image": "https://img/1.jpg"
            }))),
            2 => Ok(Json(json!({ "id": 2, "title": "Chinelo", "price": 29.9, "brand": "Havaianas" }))),
            4 => Ok(Json(json!({ "id": 5, "title": "Other", "price": 1.0, "image": "" }))),
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn start_catalog() -> String {
        let app = Router::new()
            .route("/stock/:id", get(stock))
            .route("/products/:id", get(product));
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_fetches_stock_and_product() {
        let lookup = HttpProductLookup::new(start_catalog().await, Duration::from_secs(5)).unwrap();
        assert!(!lookup.base_url().ends_with('/'));

        assert_eq!(lookup.get_stock(1).await, Ok(StockInfo { id: 1, amount: 3 }));

        let product = lookup.get_product(1).await.unwrap();
        assert_eq!(product.title, "Tenis de Caminhada");
        assert_eq!(product.price, 179.9);

        let without_image = lookup.get_product(2).await.unwrap();
        assert_eq!(without_image.image, "");
        assert_eq!(without_image.extra.get("brand"), Some(&json!("Havaianas")));
    }

    #[tokio::test]
    async fn test_maps_failures_to_lookup_errors() {
        let lookup = HttpProductLookup::new(start_catalog().await, Duration::from_secs(5)).unwrap();

        assert_eq!(lookup.get_stock(9).await, Err(LookupError::NotFound(9)));
        assert_eq!(lookup.get_product(9).await, Err(LookupError::NotFound(9)));
        assert!(matches!(lookup.get_stock(2).await, Err(LookupError::Malformed(_))));
        assert!(matches!(lookup.get_stock(3).await, Err(LookupError::Http { status: 503, .. })));
        assert!(matches!(lookup.get_product(4).await, Err(LookupError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_a_transport_error() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let lookup = HttpProductLookup::new(format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        assert!(matches!(lookup.get_stock(1).await, Err(LookupError::Transport(_))));
    }
}
