use tracing::info;
use tracing_subscriber::EnvFilter;

use noteful_api::{app, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("noteful_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!(
        "Starting Noteful API in {:?} mode ({:?} store, delete policy {:?})",
        config.environment, config.database.backend, config.notes.delete_policy
    );

    let bind_addr = config.bind_addr();
    let state = AppState::open(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Noteful API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
