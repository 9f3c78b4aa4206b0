//! Request handlers.
//!
//! Handlers decode the request, call the matching use case with a fresh
//! [`Deadline`](todo_core::deadline::Deadline) and map failures via
//! [`AppError`](crate::error::AppError).

pub mod todo;
pub mod upload;
