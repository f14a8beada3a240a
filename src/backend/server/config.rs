/**
 * Server Configuration
 *
 * Loads server configuration from the environment, most importantly the
 * optional PostgreSQL connection.
 *
 * # Error Handling
 *
 * Configuration errors are logged but do not prevent startup. When the
 * database is unavailable the server falls back to in-memory stores, which
 * is enough for local development; presence state is in-memory either way.
 */
use sqlx::PgPool;

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

/// Load and initialize the database connection pool.
///
/// Reads `DATABASE_URL`, connects, and runs migrations. Returns `None` when
/// the variable is unset or the connection fails, in which case the caller
/// runs on in-memory stores.
pub async fn load_database() -> DatabaseConfig {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Falling back to in-memory stores.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {e:?}");
            tracing::warn!("Falling back to in-memory stores.");
            return None;
        }
    };

    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("Failed to run database migrations: {e}");
        // The schema may already be in place from a previous run.
        tracing::warn!("Continuing without migrations - database might not be up to date");
    }

    Some(pool)
}

/// Port the server binds, from `SERVER_PORT` (default 3000).
pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000)
}
