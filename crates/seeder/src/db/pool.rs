//! Connection pool lifecycle.

use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool, Postgres};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::debug;

use super::dsn::ConnectionParams;
use crate::errors::SeedError;

/// A connection checked out of a [`PoolManager`].
pub type PooledConnection = PoolConnection<Postgres>;

/// Acquire deadline. sqlx needs a finite one; a year means "wait".
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Deadline for opening the first connections of a new pool.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns at most one live Postgres pool at a time.
///
/// `initialize` and `shutdown` bracket the pool's life; between them callers
/// borrow connections with `acquire` and hand them back with `release`.
/// A second `initialize` before `shutdown` fails with
/// [`SeedError::AlreadyInitialized`], including when callers race.
#[derive(Default)]
pub struct PoolManager {
    pool: Mutex<Option<PgPool>>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the pool and opens `min_connections` connections.
    ///
    /// An unreachable server fails here instead of waiting out
    /// [`ACQUIRE_TIMEOUT`]: connect errors are returned as-is and a server
    /// that never answers fails after [`CONNECT_TIMEOUT`].
    pub async fn initialize(
        &self,
        min_connections: u32,
        max_connections: u32,
        params: &ConnectionParams,
    ) -> Result<(), SeedError> {
        let mut slot = self.pool.lock().await;
        if slot.is_some() {
            return Err(SeedError::AlreadyInitialized);
        }

        let options = pool_options(min_connections, max_connections)?;
        let connect = params.connect_options();

        // The pool retries refused connects until its acquire deadline.
        check_reachable(&connect).await?;
        let pool = timeout(CONNECT_TIMEOUT, options.connect_with(connect))
            .await
            .map_err(|_| connect_timed_out())??;

        debug!(
            host = %params.host,
            database = %params.database,
            min_connections,
            max_connections,
            "Connection pool initialized"
        );
        *slot = Some(pool);
        Ok(())
    }

    /// Like [`PoolManager::initialize`], but no connection is opened until
    /// the first `acquire`.
    pub async fn initialize_lazy(
        &self,
        min_connections: u32,
        max_connections: u32,
        params: &ConnectionParams,
    ) -> Result<(), SeedError> {
        let mut slot = self.pool.lock().await;
        if slot.is_some() {
            return Err(SeedError::AlreadyInitialized);
        }

        let pool = pool_options(min_connections, max_connections)?
            .connect_lazy_with(params.connect_options());

        debug!(host = %params.host, database = %params.database, "Lazy connection pool initialized");
        *slot = Some(pool);
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.pool.lock().await.is_some()
    }

    /// Checks out a connection, waiting until one is free.
    pub async fn acquire(&self) -> Result<PooledConnection, SeedError> {
        // Clone the handle so the lock is not held while waiting.
        let pool = self
            .pool
            .lock()
            .await
            .clone()
            .ok_or(SeedError::NotInitialized)?;

        Ok(pool.acquire().await?)
    }

    /// Hands a connection back. If the pool is gone the connection is closed
    /// instead; either way this never fails.
    pub fn release(&self, conn: PooledConnection) {
        drop(conn);
    }

    /// Closes the pool and forgets it. No-op without a pool.
    ///
    /// Idle connections are closed before this returns. Connections still
    /// checked out are not waited for; they are closed when released.
    pub async fn shutdown(&self) {
        let Some(pool) = self.pool.lock().await.take() else {
            return;
        };

        let checked_out = (pool.size() as usize).saturating_sub(pool.num_idle());
        if checked_out == 0 {
            pool.close().await;
            debug!("Connection pool shut down");
        } else {
            tokio::spawn(async move { pool.close().await });
            debug!(
                checked_out,
                "Connection pool shut down, outstanding connections close on release"
            );
        }
    }
}

fn pool_options(min_connections: u32, max_connections: u32) -> Result<PgPoolOptions, SeedError> {
    if min_connections == 0 || min_connections > max_connections {
        return Err(SeedError::InvalidPoolBounds {
            min: min_connections,
            max: max_connections,
        });
    }

    Ok(PgPoolOptions::new()
        .min_connections(min_connections)
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT))
}

/// Opens and closes one connection so a dead server fails fast.
async fn check_reachable(options: &PgConnectOptions) -> Result<(), SeedError> {
    let conn = timeout(CONNECT_TIMEOUT, PgConnection::connect_with(options))
        .await
        .map_err(|_| connect_timed_out())??;
    conn.close().await?;
    Ok(())
}

fn connect_timed_out() -> SeedError {
    SeedError::Database(sqlx::Error::PoolTimedOut)
}
