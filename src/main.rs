use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use submarket::adapters::auth::JwtAuthProvider;
use submarket::adapters::http::{self, AppState};
use submarket::adapters::postgres::{PostgresAccountStore, PostgresCatalogStore};
use submarket::adapters::stripe::StripeGateway;
use submarket::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database");
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let catalog = Arc::new(PostgresCatalogStore::new(pool.clone()));
    let accounts = Arc::new(PostgresAccountStore::new(pool));
    let gateway = Arc::new(StripeGateway::new(config.payment.stripe_config()));
    let auth = Arc::new(JwtAuthProvider::new(config.auth.jwt_config()));

    let state = AppState::new(catalog, accounts, gateway, auth, config.urls.redirect_urls());
    let app = http::router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
