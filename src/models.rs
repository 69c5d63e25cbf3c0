use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::category::Category;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Todo {
    /// A fresh, incomplete todo stamped at `now`.
    pub fn new(id: String, new: NewTodo, now: OffsetDateTime) -> Self {
        Todo {
            id,
            title: new.title,
            description: new.description,
            category: new.category,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Create payload as received from a caller. Nothing is trusted until it
/// passes [`crate::validation::validate_create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        CreateTodo {
            title: Some(title.into()),
            description: None,
            category: Some(category.into()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update payload. Absent fields leave the record untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn completed(completed: bool) -> Self {
        UpdateTodo {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

/// Validated, normalized create input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
}

/// Validated, normalized update.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Category>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.completed.is_none()
    }

    pub fn apply(&self, todo: &mut Todo, updated_at: OffsetDateTime) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(category) = self.category {
            todo.category = category;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo.updated_at = updated_at;
    }
}

impl From<&TodoPatch> for UpdateTodo {
    fn from(patch: &TodoPatch) -> Self {
        UpdateTodo {
            title: patch.title.clone(),
            description: patch
                .description
                .as_ref()
                .map(|d| d.clone().unwrap_or_default()),
            category: patch.category.map(|c| c.as_str().to_string()),
            completed: patch.completed,
        }
    }
}
