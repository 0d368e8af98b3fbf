//! Covey server - main entry point.

use covey::{CoveyError, CoveyServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), CoveyError> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covey=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        capacity = config.town.capacity,
        cors = config.cors_allowed_origins.is_some(),
        "starting Covey server"
    );

    let server = CoveyServer::builder().config(config).build().await?;
    tracing::info!(
        http_addr = %server.http_addr()?,
        ws_addr = %server.ws_addr()?,
        "listening"
    );

    server.run().await
}
