//! HTTP server initialization and routing

use axum::{routing::get, Router};
use log::{error, info};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{configure_api_routes, configure_filter_routes};
use crate::shared::state::AppState;

use super::{health_check_simple, shutdown_signal, ServeMode};

pub fn build_router(app_state: Arc<AppState>, mode: ServeMode) -> Router {
    let api_router = match mode {
        ServeMode::Full => configure_api_routes(),
        ServeMode::FilterOnly => configure_filter_routes(),
    };

    Router::new()
        .route("/health", get(health_check_simple))
        .merge(api_router)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>, mode: ServeMode) -> std::io::Result<()> {
    let host = app_state.config.server.host.clone();
    let port = app_state.config.server.port;
    let app = build_router(Arc::clone(&app_state), mode);

    let listener = match tokio::net::TcpListener::bind((host.as_str(), port)).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}:{}: {} - is another instance running?",
                host, port, e
            );
            return Err(e);
        }
    };
    info!(
        "HTTP server listening on {} ({:?} mode)",
        listener.local_addr()?,
        mode
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}
