use feedbackdesk::api::middleware::AppState;
use feedbackdesk::api::router::build_router;
use feedbackdesk::config::Config;
use feedbackdesk::database::Database;
use feedbackdesk::provider::ProviderClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedbackdesk=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (provider credentials are required)
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    db.create_schema().await?;
    tracing::info!("Database connection established");

    // Provider client is constructed once and injected everywhere
    let provider = Arc::new(ProviderClient::from_config(&config));

    let state = AppState::new(db, provider);
    let app = build_router(state);

    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
