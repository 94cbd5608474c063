// Main entry point for the gateway server

use std::sync::Arc;

use anyhow::{Context, Result};
use gateway_core::domains::auth::TokenService;
use gateway_core::domains::users::{InMemoryUserStore, PgUserStore, UserStore};
use gateway_core::kernel::{ServerDeps, StreamHub};
use gateway_core::server::render::HtmlShellRenderer;
use gateway_core::server::{build_app, spawn_maintenance_tasks};
use gateway_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the log format can follow the environment
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,gateway_core=debug,gateway=debug,sqlx=warn,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(!config.environment.is_production()))
        .init();

    tracing::info!(environment = ?config.environment, "Starting gateway");

    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations complete");

            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory user store");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let tokens = Arc::new(TokenService::new(
        &config.jwt_auth_secret,
        config.jwt_ttl_hours,
    ));
    let deps = ServerDeps::new(store, tokens, StreamHub::new());

    let (app, session_store) = build_app(&config, deps.clone(), Arc::new(HtmlShellRenderer))
        .await
        .context("Failed to build application")?;
    spawn_maintenance_tasks(&config, session_store, &deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    if !config.environment.is_production() {
        tracing::info!("GraphQL playground: http://localhost:{}/api/graphql", config.port);
    }
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
