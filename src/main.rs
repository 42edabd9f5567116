//! Promotion mock backend
//!
//! Serves the promotion and metadata endpoints from memory, seeded with sample data.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use promo_wizard::config::{Config, LogFormat};
use promo_wizard::mock::{create_router, MockState, PromotionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting promotion mock backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_key.is_none() {
        tracing::warn!("No API key configured (PROMO_API_KEY). Authentication is disabled!");
    }

    let store = PromotionStore::seeded();
    tracing::info!("Seeded {} sample promotions", store.list().await.len());

    let app = create_router(MockState::new(store, config.api_key.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
