//! Todo entity and its creation request.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Timestamp};

/// Message reported when a todo fails [`TodoItem::is_valid`].
pub const INVALID_TODO_MESSAGE: &str = "invalid todo item: description is required";

/// A todo record as persisted in the `todos` table and carried in stream events.
///
/// `file_id` is a soft reference to an uploaded file. It is never checked
/// against the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: EntityId,
    pub description: String,
    pub due_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TodoItem {
    /// Build a new todo with a fresh id and `created_at == updated_at == now`.
    ///
    /// `due_date` is stored exactly as supplied.
    pub fn new(description: impl Into<String>, due_date: Timestamp, file_id: Option<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            description: description.into(),
            due_date,
            file_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.description.is_empty() && !self.id.is_nil()
    }
}

/// Input for [`TodoUseCase::create_todo`](crate::usecases::todo::TodoUseCase::create_todo).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoRequest {
    pub description: String,
    pub due_date: Timestamp,
    #[serde(default)]
    pub file_id: Option<String>,
}

impl From<CreateTodoRequest> for TodoItem {
    fn from(req: CreateTodoRequest) -> Self {
        TodoItem::new(req.description, req.due_date, req.file_id)
    }
}
