use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::db::{create_todo, delete_todo, get_todo, list_todos, update_todo};
use crate::error::AppError;
use crate::models::{CreateTodo, Todo, UpdateTodo};
use crate::validation::{validate_create, validate_update};
use crate::AppState;

pub async fn list_all_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = list_todos(&state.db)?;
    info!(count = todos.len(), "Listed todos");
    Ok(Json(todos))
}

pub async fn create_new_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let Json(req) = payload?;
    let new = validate_create(req)?;

    let todo = create_todo(&state.db, &new)?;
    info!(id = %todo.id, title = %todo.title, category = %todo.category, "Created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_single_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    match get_todo(&state.db, &id)? {
        Some(todo) => Ok(Json(todo)),
        None => Err(AppError::NotFound),
    }
}

pub async fn update_existing_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    if get_todo(&state.db, &id)?.is_none() {
        return Err(AppError::NotFound);
    }
    let Json(req) = payload?;
    let patch = validate_update(req)?;

    match update_todo(&state.db, &id, &patch)? {
        Some(todo) => {
            info!(id = %todo.id, completed = todo.completed, "Updated todo");
            Ok(Json(todo))
        }
        None => Err(AppError::NotFound),
    }
}

pub async fn delete_existing_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if delete_todo(&state.db, &id)? {
        info!(id = %id, "Deleted todo");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
