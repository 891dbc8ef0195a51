//! Repository for the `todo` table.

use sqlx::{Executor, Sqlite, SqlitePool};
use todo_core::todo::{reconcile, TodoFields, TodoPatch};
use todo_core::types::DbId;

use crate::models::todo::Todo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, completed, position_x, position_y";

/// Provides CRUD operations for todos.
pub struct TodoRepo;

impl TodoRepo {
    /// Insert a new todo, returning the created row with its assigned id.
    pub async fn create(pool: &SqlitePool, input: &TodoFields) -> Result<Todo, sqlx::Error> {
        let query = format!(
            "INSERT INTO todo (title, description, completed, position_x, position_y)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.completed)
            .bind(input.position_x)
            .bind(input.position_y)
            .fetch_one(pool)
            .await
    }

    /// Find a todo by id.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Todo>, sqlx::Error> {
        fetch(pool, id).await
    }

    /// List every todo. Ordered by id for stable output, though callers
    /// should not rely on it.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Todo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM todo ORDER BY id");
        sqlx::query_as::<_, Todo>(&query).fetch_all(pool).await
    }

    /// Overwrite every writable field of a todo.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &TodoFields,
    ) -> Result<Option<Todo>, sqlx::Error> {
        write(pool, id, input).await
    }

    /// Merge a validated patch into a todo.
    ///
    /// The read, the merge and the write run in one transaction, so either
    /// every field in `patch` lands or nothing changes. An empty patch
    /// returns the current row without writing.
    ///
    /// The transaction takes SQLite's write lock up front (`BEGIN IMMEDIATE`).
    /// Concurrent patches queue on the busy timeout and apply one after another.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn apply_patch(
        pool: &SqlitePool,
        id: DbId,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

        let Some(current) = fetch(&mut *tx, id).await? else {
            return Ok(None);
        };
        if patch.is_empty() {
            tracing::debug!(todo_id = id, "Empty patch, nothing to write");
            return Ok(Some(current));
        }

        let merged = reconcile(current.into_fields(), patch);
        let updated = write(&mut *tx, id, &merged).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Permanently delete a todo. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todo WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn fetch<'e, E>(executor: E, id: DbId) -> Result<Option<Todo>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = format!("SELECT {COLUMNS} FROM todo WHERE id = ?");
    sqlx::query_as::<_, Todo>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

async fn write<'e, E>(executor: E, id: DbId, input: &TodoFields) -> Result<Option<Todo>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = format!(
        "UPDATE todo SET
            title = ?,
            description = ?,
            completed = ?,
            position_x = ?,
            position_y = ?
         WHERE id = ?
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Todo>(&query)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.completed)
        .bind(input.position_x)
        .bind(input.position_y)
        .bind(id)
        .fetch_optional(executor)
        .await
}
