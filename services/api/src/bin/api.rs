//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, MemoryStore},
    auth::{token::TokenService, Authenticator},
    config::Config,
    error::ApiError,
    web::{self, rest::ApiDoc, state::AppState},
};
use axum::Router;
use inventory_core::{CredentialStore, InventoryService, InventoryStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Store & Run Migrations ---
    let (credentials, inventory): (Arc<dyn CredentialStore>, Arc<dyn InventoryStore>) =
        match &config.database_url {
            Some(database_url) => {
                info!("Connecting to database...");
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(database_url)
                    .await?;
                let db_adapter = Arc::new(DbAdapter::new(db_pool));
                info!("Running database migrations...");
                db_adapter.run_migrations().await?;
                info!("Database migrations complete.");
                (
                    db_adapter.clone() as Arc<dyn CredentialStore>,
                    db_adapter as Arc<dyn InventoryStore>,
                )
            }
            None => {
                warn!("DATABASE_URL is not set; using the seeded in-memory store. Data will not survive a restart.");
                let store = Arc::new(MemoryStore::seeded().await?);
                (
                    store.clone() as Arc<dyn CredentialStore>,
                    store as Arc<dyn InventoryStore>,
                )
            }
        };

    // --- 3. Build the Shared AppState ---
    let tokens = TokenService::new(&config.jwt);
    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth: Authenticator::new(credentials, tokens),
        inventory: InventoryService::new(inventory),
    });

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
