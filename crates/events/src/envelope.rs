//! Stream event envelope.

use serde::{Deserialize, Serialize};
use todo_core::error::PublishError;
use todo_core::todo::TodoItem;

/// Event type emitted after a todo row has been inserted.
pub const TODO_CREATED: &str = "todo.created";

/// A todo lifecycle event as carried in the stream's `data` field.
///
/// Built via [`TodoEvent::created`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEvent {
    /// Dot-separated event name, e.g. `"todo.created"`.
    #[serde(rename = "type")]
    pub event_type: String,

    pub todo_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_item: Option<TodoItem>,

    /// Unix seconds at which the event was built.
    pub timestamp: i64,
}

impl TodoEvent {
    /// Envelope for a freshly inserted todo, stamped with the current time.
    pub fn created(todo: &TodoItem) -> Self {
        Self {
            event_type: TODO_CREATED.to_string(),
            todo_id: todo.id.to_string(),
            todo_item: Some(todo.clone()),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Field/value pairs for `XADD`: `event_type`, `todo_id` and the JSON
    /// envelope under `data`.
    pub fn stream_fields(&self) -> Result<[(&'static str, String); 3], PublishError> {
        let data = serde_json::to_string(self)?;
        Ok([
            ("event_type", self.event_type.clone()),
            ("todo_id", self.todo_id.clone()),
            ("data", data),
        ])
    }
}
