//! HTTP surface for linksorter.
//!
//! ```text
//! GET  /            → welcome text
//! GET  /categories  → category map as JSON
//! POST /add_link    → { "url": "..." } in, updated category map out
//! ```

mod error;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use linksorter_core::Categorizer;
use linksorter_shared::{LinkSorterError, Result};

pub use error::ApiError;

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub categorizer: Arc<Categorizer>,
}

impl AppState {
    pub fn new(categorizer: Categorizer) -> Self {
        Self {
            categorizer: Arc::new(categorizer),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/categories", get(handlers::categories))
        .route("/add_link", post(handlers::add_link))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind_addr` and serve until Ctrl-C.
pub async fn serve(bind_addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| LinkSorterError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LinkSorterError::Server(e.to_string()))?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
