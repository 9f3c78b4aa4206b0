use std::sync::Arc;

use todo_core::deadline::Deadline;
use todo_core::ports::HealthProbe;
use todo_core::usecases::{FileUseCase, TodoUseCase};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc` or is itself a handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Create-todo workflow.
    pub todos: Arc<TodoUseCase>,
    /// File-upload workflow.
    pub files: Arc<FileUseCase>,
    /// Backends reported by `GET /health`, in report order.
    pub probes: Arc<[Arc<dyn HealthProbe>]>,
    /// Cancelled when the server starts shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Deadline for one workflow call: the configured budget, aborted early
    /// on shutdown.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.config.workflow_timeout()).with_cancellation(self.shutdown.clone())
    }
}
