//! Fixed datasets: the server seed and the offline demo board.

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::category::Category;
use crate::models::{NewTodo, Todo};

#[derive(Debug, Clone, Copy)]
pub struct SeedTodo {
    pub title: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub completed: bool,
}

impl SeedTodo {
    pub fn to_new_todo(&self) -> NewTodo {
        NewTodo {
            title: self.title.to_string(),
            description: Some(self.description.to_string()),
            category: self.category,
        }
    }
}

/// Inserted by the `seed` binary.
pub const SEED_TODOS: &[SeedTodo] = &[
    SeedTodo {
        title: "Learn Rust async",
        description: "Understand how futures and tasks fit together in tokio",
        category: Category::StartDoing,
        completed: false,
    },
    SeedTodo {
        title: "Build REST API",
        description: "Create a RESTful API with axum",
        category: Category::KeepDoing,
        completed: true,
    },
    SeedTodo {
        title: "Improve Code Structure",
        description: "Refactor modules for better maintainability",
        category: Category::DoDifferently,
        completed: false,
    },
    SeedTodo {
        title: "Add Unit Tests",
        description: "Write comprehensive unit tests for all modules",
        category: Category::StartDoing,
        completed: false,
    },
    SeedTodo {
        title: "Use strong types",
        description: "Continue leaning on the type system for correctness",
        category: Category::KeepDoing,
        completed: true,
    },
    SeedTodo {
        title: "Better Error Handling",
        description: "Implement more robust error handling throughout the app",
        category: Category::DoDifferently,
        completed: false,
    },
];

/// Offline board contents, each entry paired with its age in days.
const DEMO_TODOS: &[(SeedTodo, i64)] = &[
    (
        SeedTodo {
            title: "Implement automated testing",
            description: "Set up unit tests and end-to-end tests for better code quality",
            category: Category::StartDoing,
            completed: false,
        },
        1,
    ),
    (
        SeedTodo {
            title: "Use strict typing consistently",
            description: "Apply typing best practices across all components",
            category: Category::StartDoing,
            completed: true,
        },
        2,
    ),
    (
        SeedTodo {
            title: "Improve code review process",
            description: "Be more thorough in code reviews and provide constructive feedback",
            category: Category::DoDifferently,
            completed: false,
        },
        3,
    ),
    (
        SeedTodo {
            title: "Document technical decisions",
            description: "Write better documentation for architecture and design choices",
            category: Category::DoDifferently,
            completed: false,
        },
        4,
    ),
    (
        SeedTodo {
            title: "Daily standup meetings",
            description: "Continue with effective daily standups for team communication",
            category: Category::KeepDoing,
            completed: false,
        },
        5,
    ),
    (
        SeedTodo {
            title: "Pair programming sessions",
            description: "Keep doing pair programming for knowledge sharing",
            category: Category::KeepDoing,
            completed: true,
        },
        6,
    ),
];

/// Builds the demo board relative to `now`, with fresh ids.
pub fn demo_todos(now: OffsetDateTime) -> Vec<Todo> {
    DEMO_TODOS
        .iter()
        .map(|(seed, days_ago)| {
            let at = now - Duration::days(*days_ago);
            let mut todo = Todo::new(Uuid::new_v4().to_string(), seed.to_new_todo(), at);
            todo.completed = seed.completed;
            todo
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use time::macros::datetime;

    #[test]
    fn demo_board_covers_every_category_with_unique_ids() {
        let now = datetime!(2024-06-10 12:00 UTC);
        let todos = demo_todos(now);

        assert_eq!(todos.len(), 6);
        for category in Category::ALL {
            assert_eq!(todos.iter().filter(|t| t.category == category).count(), 2);
        }
        let ids: HashSet<_> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), todos.len());
        assert!(todos.iter().all(|t| t.created_at < now && t.created_at == t.updated_at));
        assert_eq!(todos[0].created_at, datetime!(2024-06-09 12:00 UTC));
    }
}
