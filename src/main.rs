use foodfleet::{
    api::{self, AppState},
    config::{database, load_config},
    core::lookup,
    errors::{Error, Result},
    square::SquareClient,
    storage::Storage,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env, non-fatal since variables can be set externally
    dotenv().ok();

    // 3. Load config.toml with environment overrides
    let app_config = load_config("config.toml")?;

    // 4. Connect, create tables and run migrations
    let db = database::init_database(&app_config.database.url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed lookup tables
    lookup::seed_lookups(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed lookup tables: {}", e))?;

    // 6. Build shared state and serve
    let square = SquareClient::new(&app_config.square)?;
    info!("Square API at {}", square.base_url());
    let storage = Storage::new(app_config.storage.root.clone());
    let bind_address = app_config.server.bind_address.clone();

    let state = AppState {
        db,
        config: Arc::new(app_config),
        storage,
        square: Arc::new(square),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
