//! Input checks and normalization shared by the HTTP handlers and both
//! stores.

use thiserror::Error;

use crate::category::Category;
use crate::models::{CreateTodo, NewTodo, TodoPatch, UpdateTodo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title cannot be empty")]
    TitleEmpty,

    #[error("Valid category is required")]
    CategoryRequired,

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Rejection reported by the remote API.
    #[error("{0}")]
    Rejected(String),
}

pub fn validate_create(input: CreateTodo) -> Result<NewTodo, ValidationError> {
    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::TitleRequired)?;

    // Missing and unknown categories read the same on create.
    let category = input
        .category
        .as_deref()
        .and_then(|c| c.parse::<Category>().ok())
        .ok_or(ValidationError::CategoryRequired)?;

    Ok(NewTodo {
        title: title.to_string(),
        description: normalize_description(input.description.as_deref()),
        category,
    })
}

pub fn validate_update(input: UpdateTodo) -> Result<TodoPatch, ValidationError> {
    let title = match input.title.as_deref().map(str::trim) {
        Some("") => return Err(ValidationError::TitleEmpty),
        Some(title) => Some(title.to_string()),
        None => None,
    };

    let category = input
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;

    Ok(TodoPatch {
        title,
        description: input
            .description
            .as_deref()
            .map(|d| normalize_description(Some(d))),
        category,
        completed: input.completed,
    })
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
