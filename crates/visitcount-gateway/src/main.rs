//! visitcount gateway
//!
//! - `ANY /`        : GET reads, POST increments, OPTIONS acknowledges
//! - `POST /invoke` : same handler, platform request/response descriptors
//! - `/healthz`, `/readyz`, `/metrics`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use visitcount_gateway::{app_state::AppState, config, router, store};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load().expect("config load failed");
    let listen = cfg.gateway.listen_addr().expect("invalid gateway.listen");

    let store = store::open(&cfg.store).expect("store open failed");
    let state = AppState::new(cfg, store).expect("app state init failed");
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "visitcount-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("server failed");
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    state.set_draining();
    tracing::info!("signal received, starting graceful shutdown");
}
