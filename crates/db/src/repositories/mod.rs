//! Repository layer.
//!
//! Repositories hold a clone of the pool (or an open transaction) and
//! implement the port traits from `todo_core::ports`.

pub mod todo_repo;

pub use todo_repo::{PgTransactionManager, PgTxTodoRepo, TodoRepo};
