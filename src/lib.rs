pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::routes::{build_app, create_router};
pub use api::{ApiError, AppState};

// Export logic types
pub use logic::{check, validate, ValidationError};

// Export all model types
pub use model::*;

// Export store types
pub use store::{
    CopyrightStore, EntityStore, MemoryStore, PostgresStore, Store, StoreError, StoreResult,
};

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppConfig, StoreBackend};

/// Serve the API for `store` on `listener` until the process stops.
pub async fn serve<S: Store + 'static>(
    store: Arc<S>,
    listener: TcpListener,
    base_path: &str,
) -> anyhow::Result<()> {
    let app = build_app(store, base_path);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn prepare<S: Store + 'static>(store: Arc<S>) -> anyhow::Result<Arc<S>> {
    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        seed::load_seed_data(store.as_ref()).await?;
    }
    Ok(store)
}

/// Connect the configured store and serve until the process stops.
pub async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let base_path = config.base_path();

    match config.database.backend {
        StoreBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let postgres_store =
                PostgresStore::new(&config.database_url(), config.max_connections()).await?;

            log::info!("Running database migrations...");
            postgres_store.migrate().await?;

            let store = prepare(Arc::new(postgres_store)).await?;
            let listener = TcpListener::bind(&bind_address).await?;
            log::info!("Lab registry running on http://{}{}", bind_address, base_path);
            serve(store, listener, &base_path).await
        }
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on shutdown");
            let store = prepare(Arc::new(MemoryStore::new())).await?;
            let listener = TcpListener::bind(&bind_address).await?;
            log::info!("Lab registry running on http://{}{}", bind_address, base_path);
            serve(store, listener, &base_path).await
        }
    }
}
