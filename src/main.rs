//! LocalLibrary server
//!
//! Serves the catalog views and the admin API over HTTP.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use locallibrary_server::{
    api,
    config::{AppConfig, LoggingConfig, SessionBackend, StorageBackend},
    repository::{CatalogStore, MemoryRepository, Repository},
    services::{
        sessions::{MemorySessionStore, RedisSessionStore, SessionStore},
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting LocalLibrary server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn CatalogStore> = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations completed");

            Arc::new(Repository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory catalog storage, records are lost on restart");
            Arc::new(MemoryRepository::new())
        }
    };

    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let store = RedisSessionStore::new(&config.redis.url, config.session.ttl_seconds)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis");
            Arc::new(store)
        }
        SessionBackend::Memory => Arc::new(MemorySessionStore::new(config.session.ttl_seconds)),
    };

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid host address {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    let services = Services::new(store, sessions, config.catalog.clone());
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Console output, pretty or JSON, plus an optional daily log file.
/// The returned guard flushes the file writer when dropped.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("locallibrary_server={},tower_http=debug", config.level).into()
    });

    let (file_layer, guard) = match config.directory {
        Some(ref directory) => {
            let appender = tracing_appender::rolling::daily(directory, "locallibrary.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
