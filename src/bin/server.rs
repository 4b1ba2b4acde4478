//! Country catalog HTTP server.

use country_catalog::{app, ensure_database_exists, ensure_tables, AppState, PgStore, ServiceConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("country_catalog=info,tower_http=info")
            }),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let store = PgStore::connect(&config.database_url, config.db_max_connections).await?;
    ensure_tables(store.pool()).await?;

    let router = app(AppState::from_store(Arc::new(store)), &config)?;
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("country catalog listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
