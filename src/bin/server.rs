//! HTTP server: loads settings from the environment, opens the store, serves the users API.

use std::sync::Arc;
use tokio::net::TcpListener;
use user_admin::store::connect_postgres;
use user_admin::{app, logging, AppState, MemoryUserStore, ServerConfig, UserStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = ServerConfig::from_env()?;
    let store: Arc<dyn UserStore> = match config.database_url {
        Some(ref url) => Arc::new(connect_postgres(url, config.db_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; users are kept in memory and lost on exit");
            Arc::new(MemoryUserStore::new())
        }
    };
    let state = AppState::new(store, config.max_per_page);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
