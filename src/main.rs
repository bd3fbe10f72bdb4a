use std::sync::Arc;

use tracing::{error, info, warn, Instrument};

use cart_store::{
    setup_tracing, spawn_catalog, CartConfig, CartSystem, CatalogClient, CatalogProductCreate, FileCartStorage,
    HttpProductLookup, ProductLookup,
};

/// Seeds the in-process catalog used when no `CART_API_URL` is configured.
async fn seed_catalog(catalog: &CatalogClient) -> Result<(), String> {
    let products = [
        ("Tenis de Caminhada Leve Confortavel", 179.9, 3),
        ("Tenis VR Caminhada Confortavel Detalhes Couro Masculino", 139.9, 1),
        ("Tenis Adidas Duramo Lite 2.0", 219.9, 5),
    ];
    for (title, price, stock) in products {
        let payload = CatalogProductCreate {
            title: title.to_string(),
            price,
            image: String::new(),
            stock,
        };
        let id = catalog.create_product(payload).await.map_err(|e| e.to_string())?;
        info!(product_id = id, title, stock, "Seeded catalog product");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = CartConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting cart demo");

    let storage = Arc::new(FileCartStorage::new(config.storage_dir.clone()).await.map_err(|e| e.to_string())?);

    let (lookup, catalog_handle): (Arc<dyn ProductLookup>, _) = match &config.api_url {
        Some(url) => {
            info!(%url, "Using REST catalog");
            let lookup: Arc<dyn ProductLookup> =
                Arc::new(HttpProductLookup::new(url, config.lookup_timeout).map_err(|e| e.to_string())?);
            (lookup, None)
        }
        None => {
            info!("CART_API_URL not set, using in-process catalog");
            let (catalog, handle) = spawn_catalog(config.channel_capacity).map_err(|e| e.to_string())?;
            seed_catalog(&catalog).await?;
            let lookup: Arc<dyn ProductLookup> = Arc::new(catalog);
            (lookup, Some(handle))
        }
    };

    let system = CartSystem::start(config.cart_options(), lookup, storage)
        .await
        .map_err(|e| e.to_string())?;
    let cart = system.cart_client.clone();
    info!(entries = cart.cart().len(), "Cart restored");

    let span = tracing::info_span!("shopping_session");
    async {
        let outcomes = [
            ("add product 1", cart.add_product(1).await),
            ("add product 1 again", cart.add_product(1).await),
            ("add product 2", cart.add_product(2).await),
            ("set product 2 to 3 units", cart.update_product_amount(2, 3).await),
            ("set product 1 to 0 units", cart.update_product_amount(1, 0).await),
            ("remove product 5", cart.remove_product(5).await),
        ];
        for (step, outcome) in outcomes {
            match outcome {
                Ok(()) => info!(step, "Done"),
                Err(e) => warn!(step, notice = e.user_message(), error = %e, "Rejected"),
            }
        }
    }
    .instrument(span)
    .await;

    let snapshot = cart.cart();
    for entry in snapshot.entries() {
        info!(product_id = entry.id(), title = %entry.product.title, amount = entry.amount, "In cart");
    }
    info!(entries = snapshot.len(), total_items = snapshot.total_items(), "Session finished");

    drop(cart);
    system.shutdown().await?;

    if let Some(handle) = catalog_handle {
        // the catalog stops once the last client, held by the cart service, is gone
        if let Err(e) = handle.await {
            error!("Catalog task failed: {:?}", e);
            return Err(format!("Catalog task failed: {:?}", e));
        }
    }

    info!("Application completed successfully");
    Ok(())
}
