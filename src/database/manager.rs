use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the decision store and its connection pool
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid view name: {0}")]
    InvalidViewName(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Connectivity failures worth a second attempt. Query and decode errors
    /// would fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlx(sqlx::Error::Io(_)) | DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
        )
    }
}

/// Builds the connection pool for the managed Postgres instance
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create a lazy pool. No connection is opened until the first query, so the
    /// server starts (and `/health` reports the outage) while the database is down.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let shown = Self::redacted(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        info!("Created database pool for: {}", shown);
        Ok(pool)
    }

    /// Connection string with the password stripped, for logs
    fn redacted(connection_string: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(connection_string).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
