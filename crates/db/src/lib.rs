//! Postgres persistence for todos.
//!
//! - [`create_pool`] / [`health_check`]: connection pool setup and liveness.
//! - [`repositories::TodoRepo`]: pool-bound repository and schema bootstrap.
//! - [`repositories::PgTransactionManager`]: runs a unit of work in one
//!   transaction with a transaction-bound repository.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use todo_core::error::BoxError;
use todo_core::ports::HealthProbe;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Create a connection pool from the database configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(5 * 60))
        .connect(&config.url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// [`HealthProbe`] over a pool, reported as `postgres`.
#[derive(Clone)]
pub struct PgHealth {
    pool: DbPool,
}

impl PgHealth {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealth {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), BoxError> {
        health_check(&self.pool).await.map_err(Into::into)
    }
}
