/**
 * Router Configuration
 *
 * Builds the Axum router for the messaging server.
 *
 * # Routes
 *
 * - `GET /ws` - WebSocket upgrade; carries the whole session protocol
 *   (connect query parameters, client commands, server events)
 * - `GET /health` - liveness probe for the deployment environment
 *
 * Everything else (account endpoints, member profiles, photos) lives in the
 * member service; unknown routes fall through to a plain 404.
 */
use crate::backend::realtime::ws_handler;
use crate::backend::server::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(|| async { "ok" }))
        .fallback(|| async { "404 Not Found" })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
