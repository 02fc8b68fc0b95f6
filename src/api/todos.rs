//! Todo CRUD endpoints.
//!
//! - `GET /api/todos` - List todos
//! - `POST /api/todos` - Create a todo (201 + `Location`)
//! - `GET /api/todos/:id` - Get a todo
//! - `PUT /api/todos/:id` - Replace a todo (204)
//! - `DELETE /api/todos/:id` - Delete a todo (204)

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use super::routes::AppState;
use crate::store::StoreError;
use crate::todo::{Todo, TodoInput, ValidatedTodo};

/// Create todo routes.
///
/// The collection is routed with and without a trailing slash; the browser
/// client calls `/api/todos/`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/", get(list_todos).post(create_todo))
        .route(
            "/api/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

fn storage_error(e: StoreError) -> (StatusCode, String) {
    tracing::error!("Todo store error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Storage error: {}", e),
    )
}

fn not_found(id: i64) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Todo {} not found", id))
}

fn validate(input: TodoInput) -> Result<ValidatedTodo, (StatusCode, String)> {
    input
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// GET /api/todos - List all todos.
async fn list_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Todo>>, (StatusCode, String)> {
    state.store.list_todos().await.map(Json).map_err(storage_error)
}

/// GET /api/todos/:id - Get a single todo.
async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, (StatusCode, String)> {
    state
        .store
        .get_todo(id)
        .await
        .map_err(storage_error)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /api/todos - Create a todo.
async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TodoInput>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Todo>), (StatusCode, String)> {
    let input = validate(req)?;
    let todo = state.store.create_todo(input).await.map_err(storage_error)?;

    tracing::info!(todo_id = todo.id, "Created todo '{}'", todo.title);

    let location = format!("/api/todos/{}", todo.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(todo)))
}

/// PUT /api/todos/:id - Replace all writable fields of a todo.
async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<TodoInput>,
) -> Result<StatusCode, (StatusCode, String)> {
    let input = validate(req)?;
    match state
        .store
        .update_todo(id, input)
        .await
        .map_err(storage_error)?
    {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(not_found(id)),
    }
}

/// DELETE /api/todos/:id - Delete a todo.
async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.store.delete_todo(id).await.map_err(storage_error)? {
        tracing::info!(todo_id = id, "Deleted todo");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
