//! API server entry point.

use std::sync::Arc;

use api::{AppState, Config, LogFormat, SharedStore};
use order_store::{InMemoryOrderStore, PostgresOrderStore};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn connect_store(config: &Config) -> SharedStore {
    let Some(url) = config.database_url.as_deref() else {
        tracing::info!("DATABASE_URL not set, using the in-memory order store");
        return Arc::new(InMemoryOrderStore::new());
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await
        .expect("failed to connect to Postgres");
    let store = PostgresOrderStore::new(pool);
    store
        .run_migrations()
        .await
        .expect("failed to run migrations");
    tracing::info!(
        max_connections = config.database_max_connections,
        "connected to Postgres order store"
    );
    Arc::new(store)
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Connect the store and wire the application state
    let store = connect_store(&config).await;
    let state = Arc::new(AppState::new(store, config.policy));

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, min_order = %config.policy.min_order, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
