//! Capability traits implemented by the infrastructure adapters.
//!
//! The use cases in [`crate::usecases`] depend only on these traits. Postgres,
//! Redis and S3 adapters live in their own crates; in-memory implementations
//! live in `crate::memory` behind the `test-util` feature.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{BoxError, CoreError, PublishError, StorageError};
use crate::todo::TodoItem;

// ---------------------------------------------------------------------------
// Relational store
// ---------------------------------------------------------------------------

/// Insert side of the `todos` table.
///
/// Implemented both by pool-bound repositories and by the transaction-bound
/// handle a [`TransactionManager`] passes into a [`UnitOfWork`], so callers
/// never need to know which one they hold.
#[async_trait]
pub trait TodoRepository: Send {
    /// Insert exactly one row for `todo`.
    async fn create(&mut self, todo: &TodoItem) -> Result<(), StorageError>;
}

/// Schema bootstrap for the `todos` table. Called once at startup.
#[async_trait]
pub trait TodoSchema: Send + Sync {
    /// Create the table and its indexes if they do not exist yet.
    async fn init_schema(&self) -> Result<(), StorageError>;
}

/// Work executed inside one relational transaction.
///
/// Receives the transaction-scoped repository. Returning `Err` rolls the
/// transaction back.
pub type UnitOfWork = Box<
    dyn for<'r> FnOnce(&'r mut dyn TodoRepository) -> BoxFuture<'r, Result<(), CoreError>> + Send,
>;

/// Box a closure as a [`UnitOfWork`].
///
/// Passing the closure through this function lets the compiler infer the
/// higher-ranked signature, e.g.
/// `unit_of_work(move |repo| Box::pin(async move { repo.create(&todo).await?; Ok(()) }))`.
pub fn unit_of_work<F>(work: F) -> UnitOfWork
where
    F: for<'r> FnOnce(&'r mut dyn TodoRepository) -> BoxFuture<'r, Result<(), CoreError>>
        + Send
        + 'static,
{
    Box::new(work)
}

/// Runs a [`UnitOfWork`] inside a single relational transaction.
///
/// Contract:
/// - begin failure is reported as [`StorageError::Begin`];
/// - an `Err` from the unit of work triggers a rollback and is returned unmodified;
/// - commit failure is reported as [`StorageError::Commit`].
///
/// Side effects the unit of work performs outside the relational store (such
/// as publishing an event) are not covered by the rollback.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn do_in_tx(&self, work: UnitOfWork) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// Event stream
// ---------------------------------------------------------------------------

/// Appends todo lifecycle events to a durable stream. Never retries.
#[async_trait]
pub trait StreamPublisher: Send + Sync {
    async fn publish_todo_created(&self, todo: &TodoItem) -> Result<(), PublishError>;
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// Blob store for uploaded file contents.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write `data` under `storage_path`.
    async fn upload_file(
        &self,
        storage_path: &str,
        content_type: &str,
        data: Vec<u8>,
        size: i64,
    ) -> Result<(), StorageError>;

    /// Create the target bucket if it does not exist.
    async fn ensure_bucket(&self) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Liveness probe for one backend, reported individually by `GET /health`.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Service name used as the key in the health report.
    fn name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), BoxError>;
}
