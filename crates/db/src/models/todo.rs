//! Todo entity model.

use serde::Serialize;
use sqlx::FromRow;
use todo_core::todo::TodoFields;
use todo_core::types::DbId;

/// A row from the `todo` table. Serializes to the public JSON shape.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Todo {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

impl Todo {
    /// Split off the writable fields, dropping the id.
    pub fn into_fields(self) -> TodoFields {
        TodoFields {
            title: self.title,
            description: self.description,
            completed: self.completed,
            position_x: self.position_x,
            position_y: self.position_y,
        }
    }
}
