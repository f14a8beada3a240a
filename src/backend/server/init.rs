/**
 * Server Initialization
 *
 * Assembles the application: store selection, hub construction, and router
 * creation.
 *
 * # Initialization Steps
 *
 * 1. Load the optional database connection (`DATABASE_URL`)
 * 2. Pick the store implementations: Postgres when a pool is available,
 *    in-memory otherwise
 * 3. Construct the hub (presence tracker, client dispatch, group manager)
 * 4. Build the router
 */
use crate::backend::routes::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::{AppState, Hub};
use crate::backend::store::db::PgStore;
use crate::backend::store::memory::{MemoryStore, OpenDirectory};
use axum::Router;
use std::sync::Arc;

/// Create and configure the Axum application.
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing kindred messaging server");

    let hub = match load_database().await {
        Some(pool) => {
            let store = Arc::new(PgStore::new(pool));
            Hub::new(store.clone(), store.clone(), store)
        }
        None => {
            // Development fallback: in-memory persistence, any username
            // resolves.
            let store = Arc::new(MemoryStore::new());
            Hub::new(Arc::new(OpenDirectory), store.clone(), store)
        }
    };

    tracing::info!("Hub initialized");
    create_router(AppState::new(hub))
}
