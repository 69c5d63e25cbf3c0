use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::board::Board;
use crate::db::list_todos;
use crate::error::AppError;
use crate::AppState;

pub async fn board(State(state): State<AppState>) -> Result<Json<Board>, AppError> {
    let todos = list_todos(&state.db)?;
    Ok(Json(Board::project(&todos)))
}

pub async fn plain_text_board(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let todos = list_todos(&state.db)?;
    let text = Board::project(&todos).render_plain();

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        text,
    ))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
