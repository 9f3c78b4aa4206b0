//! Create-todo workflow: relational insert and stream publish in one transaction.
//!
//! Ordering inside [`TodoUseCase::create_todo`]:
//!
//! 1. build and validate the record (no I/O);
//! 2. begin a transaction;
//! 3. insert the row through the transaction-bound repository;
//! 4. publish `todo.created`;
//! 5. commit only if both 3 and 4 succeeded, otherwise roll back.
//!
//! The publish in step 4 is not part of the relational transaction. A row is
//! never committed without a publish attempt, but an event that reached the
//! stream does not guarantee a committed row (the commit can still fail, or
//! the publish may have landed before its error was reported). Stream
//! consumers must therefore treat `todo.created` idempotently and must not
//! assume the row exists.
//!
//! The caller's [`Deadline`] bounds the insert and the publish. Begin is
//! bounded by the pool's acquire timeout, and the commit is never abandoned
//! once issued: an `Err` from this workflow always means no row was committed.

use std::sync::Arc;

use crate::deadline::Deadline;
use crate::error::CoreError;
use crate::ports::{unit_of_work, StreamPublisher, TransactionManager};
use crate::todo::{CreateTodoRequest, TodoItem, INVALID_TODO_MESSAGE};

pub struct TodoUseCase {
    tx_manager: Arc<dyn TransactionManager>,
    publisher: Arc<dyn StreamPublisher>,
}

impl TodoUseCase {
    pub fn new(tx_manager: Arc<dyn TransactionManager>, publisher: Arc<dyn StreamPublisher>) -> Self {
        Self {
            tx_manager,
            publisher,
        }
    }

    /// Create, persist and announce a todo.
    ///
    /// Fails with [`CoreError::Validation`] before any I/O when the description
    /// is empty. Any storage, publish, timeout or cancellation failure is
    /// returned as [`CoreError::Workflow`] prefixed with `failed to create todo`,
    /// and leaves no row behind.
    pub async fn create_todo(
        &self,
        req: CreateTodoRequest,
        deadline: &Deadline,
    ) -> Result<TodoItem, CoreError> {
        let todo = TodoItem::from(req);

        if !todo.is_valid() {
            return Err(CoreError::Validation(INVALID_TODO_MESSAGE.to_string()));
        }

        let work = {
            let todo = todo.clone();
            let publisher = Arc::clone(&self.publisher);
            let deadline = deadline.clone();
            unit_of_work(move |repo| {
                Box::pin(async move {
                    deadline.run("insert todo", repo.create(&todo)).await?;
                    deadline
                        .run(
                            "publish todo.created event",
                            publisher.publish_todo_created(&todo),
                        )
                        .await?;
                    Ok::<(), CoreError>(())
                })
            })
        };

        self.tx_manager
            .do_in_tx(work)
            .await
            .map_err(|err| {
                tracing::error!(todo_id = %todo.id, error = %err, "Create todo workflow failed");
                CoreError::workflow("failed to create todo", err)
            })?;

        tracing::info!(todo_id = %todo.id, "Todo created");
        Ok(todo)
    }
}
