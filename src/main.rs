use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nexxa_auto::config::{database::create_pool, AppConfig};
use nexxa_auto::repositories::InMemoryStore;
use nexxa_auto::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "nexxa_auto=info,tower_http=info,sqlx=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    if config.clerk.secret_key.is_none() {
        tracing::warn!("CLERK_SECRET_KEY not set - authenticated routes will reject every request");
    }
    if config.email.api_key.is_none() {
        tracing::warn!("RESEND_API_KEY not set - notification emails are disabled");
    }
    if !config.analytics.is_configured() {
        tracing::warn!("Google Analytics credentials not set - server-side events are disabled");
    }

    let state = match config.database.clone() {
        Some(database) => {
            let pool = create_pool(&database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Connected to PostgreSQL, migrations applied");
            AppState::with_postgres(config, pool)
        }
        None => {
            tracing::warn!("No database configured - using the in-memory store with a sample catalog");
            AppState::in_memory(config, Arc::new(InMemoryStore::with_sample_catalog()))
        }
    };

    let addr: SocketAddr = state
        .config
        .server_address()
        .parse()
        .context("SERVER_HOST/SERVER_PORT do not form a valid socket address")?;
    let app = create_app(state);

    tracing::info!("Starting Nexxa Auto Parts API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
