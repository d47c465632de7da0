//! API server entry point.

use api::config::Config;
use domain::UnitOfWork;
use metrics_exporter_prometheus::{BuildError, PrometheusHandle};
use persistence::{InMemoryUnitOfWork, PostgresUnitOfWork, StorageError};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Failures that stop the server from starting or keep it from running.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to install Prometheus recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("storage setup failed: {0}")]
    Storage(#[from] StorageError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

async fn serve<U: UnitOfWork + 'static>(
    unit_of_work: U,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Result<(), StartupError> {
    let state = api::create_default_state(unit_of_work);
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 3. Pick the storage backend and serve
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!(
                max_connections = config.database_max_connections,
                timeout_ms = config.database_timeout.as_millis() as u64,
                "using PostgreSQL storage"
            );
            let unit_of_work = PostgresUnitOfWork::connect(
                url,
                config.database_max_connections,
                config.database_timeout,
            )
            .await?;
            unit_of_work.run_migrations().await?;
            serve(unit_of_work, metrics_handle, &config).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data is kept in memory only");
            serve(InMemoryUnitOfWork::new(), metrics_handle, &config).await
        }
    }
}
