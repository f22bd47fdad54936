//! Pet store server: resolves settings, provisions the backend, serves until a shutdown
//! signal, then removes the database it created.
//!
//! Run from repo root: `cargo run -p pet-store-server`

use clap::Parser;
use pet_store_api::{app, shutdown_signal, AppState, Authenticator, Database, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("pet_store_api=info,pet_store=info,tower_http=info")
            }),
        )
        .init();

    let settings = Settings::parse();
    let backend = settings.backend()?;
    let db = Database::open(backend, settings.max_connections).await?;
    db.provision().await?;

    let state = AppState::new(db.store(), Authenticator::new(&settings.auth()));
    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.teardown().await?;
    tracing::info!("shutdown complete");
    Ok(())
}
