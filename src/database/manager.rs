use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from the control-plane and tenant database layers
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Tenant query timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owner of the control-plane pool (users, tenant connection records)
pub struct DatabaseManager;

static MAIN_POOL: OnceCell<PgPool> = OnceCell::const_new();

impl DatabaseManager {
    /// Control-plane pool, created lazily on first use. Connections are only
    /// opened when a query runs, so the server can start without the database.
    pub async fn main_pool() -> Result<PgPool, DatabaseError> {
        MAIN_POOL
            .get_or_try_init(|| async {
                let url = std::env::var("DATABASE_URL")
                    .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
                let settings = &config::config().database;

                let pool = PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(Duration::from_secs(settings.connection_timeout))
                    .connect_lazy(&url)?;

                info!("Created control-plane pool for: {}", Self::redacted_url(&url)?);
                Ok::<PgPool, DatabaseError>(pool)
            })
            .await
            .cloned()
    }

    /// Pings the main pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::main_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close_all() {
        if let Some(pool) = MAIN_POOL.get() {
            pool.close().await;
            info!("Closed control-plane pool");
        }
    }

    /// Connection string with the password masked, for logs
    fn redacted_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("****")).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
