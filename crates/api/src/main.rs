use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_api::config::AppConfig;
use todo_api::router::build_app_router;
use todo_api::state::AppState;
use todo_core::ports::{FileStorage, HealthProbe, TodoSchema};
use todo_core::usecases::{FileUseCase, TodoUseCase};
use todo_db::repositories::{PgTransactionManager, TodoRepo};
use todo_db::PgHealth;
use todo_events::RedisStreamPublisher;
use todo_storage::S3FileStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "todo_api=debug,todo_core=debug,todo_db=debug,todo_events=debug,\
                 todo_storage=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = todo_db::create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    todo_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    TodoRepo::new(pool.clone())
        .init_schema()
        .await
        .context("Failed to initialise database schema")?;
    tracing::info!("Database schema ready");

    // --- Event stream ---
    let publisher = RedisStreamPublisher::connect(&config.stream)
        .await
        .context("Failed to connect to Redis")?;
    tracing::info!(stream = %publisher.stream_name(), "Redis stream publisher ready");

    // --- Object storage ---
    let storage = S3FileStorage::connect(&config.storage).await;
    match storage.ensure_bucket().await {
        Ok(()) => tracing::info!(bucket = %storage.bucket(), "Object storage ready"),
        Err(e) => tracing::warn!(
            bucket = %storage.bucket(),
            error = %e,
            "Could not ensure bucket exists; uploads may fail"
        ),
    }

    // --- App state ---
    let publisher = Arc::new(publisher);
    let probes: Vec<Arc<dyn HealthProbe>> = vec![
        Arc::new(PgHealth::new(pool.clone())) as Arc<dyn HealthProbe>,
        publisher.clone() as Arc<dyn HealthProbe>,
    ];
    let shutdown = CancellationToken::new();

    let state = AppState {
        config: Arc::new(config.server.clone()),
        todos: Arc::new(TodoUseCase::new(
            Arc::new(PgTransactionManager::new(pool.clone())),
            publisher,
        )),
        files: Arc::new(FileUseCase::new(Arc::new(storage))),
        probes: probes.into(),
        shutdown: shutdown.clone(),
    };

    let app = build_app_router(state, &config.server);

    // --- Start server ---
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Starting server");

    let server = axum::serve(listener, app).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    // Bound the drain: once the signal fires, in-flight requests get
    // `shutdown_timeout` to finish.
    let drain_timeout = config.server.shutdown_timeout();
    tokio::select! {
        result = server.into_future() => result.context("Server error")?,
        () = async {
            shutdown.cancelled().await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            tracing::warn!(?drain_timeout, "Shutdown drain timed out, dropping open connections");
        }
    }

    // --- Post-shutdown cleanup ---
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
