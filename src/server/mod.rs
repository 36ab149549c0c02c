//! HTTP surface of the dashboard.

pub mod handlers;
pub mod outcome;
pub mod prefix;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::render::Renderer;
use crate::rpc::ConfigService;

pub use outcome::{HandlerResult, OrRedirect, Outcome};
pub use prefix::{MountSettings, RequestPrefix};

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Built once at startup, read-only afterwards.
pub struct AppState {
    pub renderer: Renderer,
    pub service: Arc<dyn ConfigService>,
    pub mount: MountSettings,
}

pub type SharedState = Arc<AppState>;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/audit", get(handlers::audit_log))
        .route(
            "/search",
            get(handlers::search_form).post(handlers::search_results),
        )
        .route("/config", get(handlers::config_missing))
        .route("/config/", get(handlers::config_missing))
        .route("/config/:id", get(handlers::config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: SharedState) -> Result<(), ServeError> {
    let router = build_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServeError::Bind { addr, source: e })?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServeError::Serve { source: e })?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
