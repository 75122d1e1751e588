use std::str::FromStr;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use tracing::{debug, info, instrument};

use crate::db::DbError;

/// A pooled connection checked out for one query operation.
///
/// Dropping it returns the connection to the pool, on every exit path.
pub type Session = PoolConnection<Sqlite>;

#[derive(Clone)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the observation store read-only; the database file must already exist
    #[instrument]
    pub async fn connect_read_only(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(DbError::StoreUnavailable)?;

        info!("Opened observation store read-only ({} connections max)", max_connections);
        Ok(Self { pool })
    }

    /// Check out a session for the duration of one query operation
    pub async fn session(&self) -> Result<Session, DbError> {
        debug!("Acquiring store session");
        self.pool.acquire().await.map_err(DbError::StoreUnavailable)
    }
}
