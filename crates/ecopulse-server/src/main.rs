//! EcoPulse server.
//!
//! - Loads `ECOPULSE_CONFIG` (default `ecopulse.yaml`)
//! - Spawns the simulator engine and its override feeds
//! - Serves snapshots over HTTP and WebSocket until SIGINT/SIGTERM

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecopulse_core::error::{EcoPulseError, Result};
use ecopulse_server::{
    app_state::AppState, config, engine::Engine, feeds::FeedRegistry, obs::ServiceMetrics, ops,
    router,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "ecopulse-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;
    let drain_grace = cfg.server.drain_grace();

    let metrics = Arc::new(ServiceMetrics::default());
    let feeds = FeedRegistry::from_config(&cfg)?;
    let engine = Engine::from_config(&cfg, feeds, Arc::clone(&metrics))?.spawn();

    let state = AppState::new(cfg, engine.snapshots(), Arc::clone(&metrics));
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "ecopulse-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| EcoPulseError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Still accepting here, so /readyz answers 503 during the grace.
            ops::drain(&metrics, drain_grace).await;
            // Stopping the engine closes every WebSocket session.
            if let Err(e) = engine.shutdown().await {
                tracing::error!(error = %e, "engine shutdown failed");
            }
        })
        .await
        .map_err(|e| EcoPulseError::Internal(format!("server failed: {e}")))?;

    tracing::info!("ecopulse-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
