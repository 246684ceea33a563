use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use openlms::logging::{init_tracing, shutdown_tracer};
use openlms::metrics::{init_metrics, metrics_app};
use openlms::router::init_router;
use openlms::state::AppState;
use openlms::store::PgStore;
use openlms_db::{init_db_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing().context("failed to initialize logging")?;

    if let Some(handle) = init_metrics() {
        let metrics_addr =
            std::env::var("METRICS_ADDR").unwrap_or_else(|_| "0.0.0.0:9090".to_string());
        let listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
        info!("Metrics available at http://{}/metrics", metrics_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                tracing::error!(error = %e, "metrics server stopped");
            }
        });
    }

    let pool = init_db_pool().await.context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let state = AppState::from_env(Arc::new(PgStore::new(pool)));
    if state.rate_limit_config.enabled {
        state.rate_limiters.spawn_pruner(Duration::from_secs(
            state.rate_limit_config.prune_interval_secs,
        ));
    }
    let app = init_router(state);

    let addr = std::env::var("APP_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{}", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
    })
    .await
    .context("server error")?;

    shutdown_tracer().await;
    Ok(())
}
