//! Repository and transaction manager for the `todos` table.

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use todo_core::error::{CoreError, StorageError};
use todo_core::ports::{TodoRepository, TodoSchema, TransactionManager, UnitOfWork};
use todo_core::todo::TodoItem;
use todo_core::types::EntityId;

use crate::models::todo::TodoRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, description, due_date, file_id, created_at, updated_at";

/// Idempotent DDL, executed statement by statement.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS todos (
        id          VARCHAR(36) PRIMARY KEY,
        description TEXT        NOT NULL,
        due_date    TIMESTAMPTZ NOT NULL,
        file_id     TEXT        NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_todos_due_date ON todos (due_date)",
    "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_todos_file_id ON todos (file_id)",
];

/// Insert one todo row through any executor (pool or open transaction).
async fn insert_todo<'e, E>(executor: E, todo: &TodoItem) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("INSERT INTO todos ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)");
    sqlx::query(&query)
        .bind(todo.id.to_string())
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(&todo.file_id)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(executor)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Pool-bound repository
// ---------------------------------------------------------------------------

/// Pool-bound todo repository. Each write runs in its own implicit transaction.
#[derive(Clone)]
pub struct TodoRepo {
    pool: PgPool,
}

impl TodoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a committed todo by id.
    pub async fn find_by_id(&self, id: EntityId) -> Result<Option<TodoItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM todos WHERE id = $1");
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TodoItem::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }

    /// Count committed rows referencing `file_id`.
    pub async fn count_by_file_id(&self, file_id: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE file_id = $1")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

#[async_trait]
impl TodoRepository for TodoRepo {
    async fn create(&mut self, todo: &TodoItem) -> Result<(), StorageError> {
        insert_todo(&self.pool, todo)
            .await
            .map_err(|e| StorageError::Insert(e.into()))
    }
}

#[async_trait]
impl TodoSchema for TodoRepo {
    async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Schema(e.into()))?;
        }
        tracing::debug!("todos schema ensured");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transaction-bound repository
// ---------------------------------------------------------------------------

/// Todo repository bound to an open transaction.
///
/// Only handed out by [`PgTransactionManager`]; its writes become visible to
/// other connections when the manager commits.
pub struct PgTxTodoRepo {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TodoRepository for PgTxTodoRepo {
    async fn create(&mut self, todo: &TodoItem) -> Result<(), StorageError> {
        insert_todo(&mut *self.tx, todo)
            .await
            .map_err(|e| StorageError::Insert(e.into()))
    }
}

// ---------------------------------------------------------------------------
// Transaction manager
// ---------------------------------------------------------------------------

/// Runs units of work inside a Postgres transaction taken from the pool.
#[derive(Clone)]
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn do_in_tx(&self, work: UnitOfWork) -> Result<(), CoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Begin(e.into()))?;
        let mut repo = PgTxTodoRepo { tx };

        let outcome = {
            let handle: &mut dyn TodoRepository = &mut repo;
            work(handle).await
        };

        if let Err(err) = outcome {
            if let Err(rollback_err) = repo.tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Failed to roll back transaction");
            }
            return Err(err);
        }

        repo.tx
            .commit()
            .await
            .map_err(|e| StorageError::Commit(e.into()))?;
        Ok(())
    }
}
