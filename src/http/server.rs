//! HTTP server setup.
//!
//! # Responsibilities
//! - Create Axum Router with the echo handler
//! - Wire up middleware (tracing, language resolution)
//! - Bind server to listener and shut down on Ctrl+C

use axum::{routing::any, Extension, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::middleware::{language_layer, ResolvedRoute};
use crate::routing::{LanguageRouter, LanguageRoutes};

/// Build the Axum router with all middleware layers.
pub fn build_app(routes: Arc<LanguageRoutes>) -> Router {
    let app = Router::new()
        .route("/", any(echo_handler))
        .route("/{*path}", any(echo_handler));
    language_layer(app, routes).layer(TraceLayer::new_for_http())
}

/// Serve `app` until Ctrl+C.
pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Echoes the resolved route along with its canonical URL.
async fn echo_handler(
    Extension(resolved): Extension<ResolvedRoute>,
    Extension(mut router): Extension<LanguageRouter>,
) -> Json<Value> {
    let canonical = router.generate(&resolved.route, &resolved.params).ok();
    Json(json!({
        "route": resolved.route,
        "params": resolved.params,
        "language": resolved.language,
        "locale": resolved.locale,
        "canonical": canonical,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
