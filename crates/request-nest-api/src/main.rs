//! request-nest server entry point.

use std::net::SocketAddr;

use request_nest_api::config::Config;
use request_nest_api::error::AppError;
use request_nest_api::state::AppState;
use request_nest_api::{build_router, telemetry};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!(
        max_body_size = config.api.capture_limits.max_body_size,
        base_url = %config.api.base_url,
        "Starting request-nest server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.api.db_timeout)
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("../../migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let addr = config.bind_addr()?;
    let app = build_router(AppState::with_postgres(pool.clone(), config.api));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped, closing database pool");
    pool.close().await;
    telemetry.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
