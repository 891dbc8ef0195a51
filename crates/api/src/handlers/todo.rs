//! Handlers for the `/todos` resource.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use todo_core::error::CoreError;
use todo_core::todo::{validate_create, validate_update};
use todo_core::types::DbId;
use todo_db::models::todo::Todo;
use todo_db::repositories::TodoRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    tracing::warn!(todo_id = id, "Todo not found");
    AppError::Core(CoreError::NotFound { entity: "Todo", id })
}

/// GET /todos/
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Todo>>> {
    tracing::info!("Retrieving all todos");
    let todos = TodoRepo::list(&state.pool).await?;
    tracing::debug!(count = todos.len(), "Found todos");
    Ok(Json(todos))
}

/// POST /todos/
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Todo>)> {
    tracing::info!("Creating new todo");
    let Json(payload) = payload?;

    let fields = validate_create(&payload).inspect_err(|errors| {
        tracing::error!(%errors, "Validation error while creating todo");
    })?;

    let todo = TodoRepo::create(&state.pool, &fields).await?;
    tracing::info!(todo_id = todo.id, "Created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /todos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Todo>> {
    let Path(id) = path?;
    tracing::info!(todo_id = id, "Retrieving todo");
    let todo = TodoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::debug!(todo_id = id, title = %todo.title, "Found todo");
    Ok(Json(todo))
}

/// PUT /todos/{id}
///
/// Only the fields present in the body are changed. The body is validated
/// before the store is touched, so a rejected update leaves the row as it was.
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Todo>> {
    let Path(id) = path?;
    tracing::info!(todo_id = id, "Updating todo");
    let Json(payload) = payload?;

    let patch = validate_update(&payload).inspect_err(|errors| {
        tracing::error!(todo_id = id, %errors, "Validation error while updating todo");
    })?;

    let todo = TodoRepo::apply_patch(&state.pool, id, patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(todo_id = id, "Successfully updated todo");
    Ok(Json(todo))
}

/// DELETE /todos/{id}
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    tracing::info!(todo_id = id, "Deleting todo");
    let deleted = TodoRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(todo_id = id, "Successfully deleted todo");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
