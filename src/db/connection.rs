// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - One pooled connection per logical operation, returned on every exit path
// - SQLite work never runs on an async worker thread

use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tokio_util::sync::CancellationToken;

use crate::config::CatalogConfig;
use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Create a connection pool for the configured database file
///
/// Every connection gets:
/// - Foreign keys enabled
/// - WAL journal mode
/// - Busy timeout from config
pub fn create_connection_pool(config: &CatalogConfig) -> AppResult<ConnectionPool> {
    let db_path = config.database_path()?;
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);

    let manager = SqliteConnectionManager::file(&db_path).with_init(move |conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.busy_timeout(busy_timeout)?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    log::info!(
        "Opened catalog database at {} (max {} connections)",
        db_path.display(),
        config.max_connections
    );

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

/// Fail with `Cancelled` once the caller has given up
pub fn ensure_active(cancel: &CancellationToken) -> AppResult<()> {
    if cancel.is_cancelled() {
        Err(AppError::Cancelled)
    } else {
        Ok(())
    }
}

/// Run `work` on the blocking pool with a connection of its own.
///
/// The connection goes back to the pool when `work` returns, whatever the
/// outcome. A token cancelled before the connection is acquired short-circuits
/// with `Cancelled`; `work` receives the token to check between statements.
pub async fn run_blocking<T, F>(
    pool: &Arc<ConnectionPool>,
    cancel: &CancellationToken,
    work: F,
) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection, &CancellationToken) -> AppResult<T> + Send + 'static,
{
    ensure_active(cancel)?;

    let pool = Arc::clone(pool);
    let cancel = cancel.clone();

    tokio::task::spawn_blocking(move || {
        let mut conn = get_connection(&pool)?;
        ensure_active(&cancel)?;
        work(&mut conn, &cancel)
    })
    .await?
}

/// Pool over a fresh database file inside a temporary directory.
/// The directory (and database) is removed when the `TempDir` drops.
#[cfg(test)]
pub fn create_test_pool() -> AppResult<(tempfile::TempDir, Arc<ConnectionPool>)> {
    let dir = tempfile::tempdir()?;
    let config = CatalogConfig {
        database_path: Some(dir.path().join("catalog-test.db")),
        max_connections: 4,
        ..CatalogConfig::default()
    };

    let pool = create_connection_pool(&config)?;
    {
        let conn = get_connection(&pool)?;
        crate::db::initialize_database(&conn)?;
    }

    Ok((dir, Arc::new(pool)))
}
