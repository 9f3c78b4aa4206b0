//! Row model for the `todos` table.

use sqlx::FromRow;
use todo_core::todo::TodoItem;
use todo_core::types::Timestamp;

/// A row from the `todos` table. `id` is stored as its 36-char string form.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: String,
    pub description: String,
    pub due_date: Timestamp,
    pub file_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<TodoRow> for TodoItem {
    type Error = uuid::Error;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(TodoItem {
            id: row.id.parse()?,
            description: row.description,
            due_date: row.due_date,
            file_id: row.file_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
