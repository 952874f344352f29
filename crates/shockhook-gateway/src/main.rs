//! shockhook relay
//!
//! - Webhook endpoint: POST /command/{secret}
//! - Admin form: /admin (apply policy, toggle pause)
//! - Policy persisted under the state directory and restored on start

use tracing_subscriber::{fmt, EnvFilter};

use shockhook_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(err = %e, "shockhook exited with error");
        std::process::exit(1);
    }
}

async fn run() -> shockhook_core::Result<()> {
    let cfg = config::load()?;
    let listen = cfg.server.listen_addr()?;

    let state = AppState::open(&cfg).await?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| shockhook_core::ShockhookError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "shockhook starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| shockhook_core::ShockhookError::Internal(format!("server failed: {e}")))?;

    tracing::info!("shockhook stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(err = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
