//! Per-category board columns derived from a todo collection.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::category::Category;
use crate::models::Todo;
use crate::store::StoreSnapshot;

/// Open items first, then newest first.
pub fn board_order(a: &Todo, b: &Todo) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// The todos of one category in board order. Never touches `todos`.
pub fn column(todos: &[Todo], category: Category) -> Vec<Todo> {
    let mut column: Vec<Todo> = todos
        .iter()
        .filter(|t| t.category == category)
        .cloned()
        .collect();
    column.sort_by(board_order);
    column
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub start_doing: Vec<Todo>,
    pub do_differently: Vec<Todo>,
    pub keep_doing: Vec<Todo>,
    pub total: usize,
    pub completed: usize,
}

impl Board {
    pub fn project(todos: &[Todo]) -> Self {
        Board {
            start_doing: column(todos, Category::StartDoing),
            do_differently: column(todos, Category::DoDifferently),
            keep_doing: column(todos, Category::KeepDoing),
            total: todos.len(),
            completed: todos.iter().filter(|t| t.completed).count(),
        }
    }

    pub fn column(&self, category: Category) -> &[Todo] {
        match category {
            Category::StartDoing => &self.start_doing,
            Category::DoDifferently => &self.do_differently,
            Category::KeepDoing => &self.keep_doing,
        }
    }

    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total: {}  Completed: {}", self.total, self.completed);
        for category in Category::ALL {
            let todos = self.column(category);
            let _ = writeln!(out, "\n{} ({})", category.heading(), todos.len());
            for todo in todos {
                let mark = if todo.completed { 'x' } else { ' ' };
                let _ = writeln!(out, "[{mark}] {}", todo.title);
            }
        }
        out
    }
}

/// Keeps a [`Board`] in sync with a store.
///
/// The projection is recomputed only when the store publishes a different
/// collection; `loading`/`error` changes reuse the previous board. The task
/// ends once the store is dropped.
pub fn watch_board(mut snapshots: watch::Receiver<StoreSnapshot>) -> watch::Receiver<Board> {
    let mut source = Arc::clone(&snapshots.borrow_and_update().todos);
    let (tx, rx) = watch::channel(Board::project(&source));

    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let todos = Arc::clone(&snapshots.borrow_and_update().todos);
            if Arc::ptr_eq(&todos, &source) {
                continue;
            }
            source = todos;
            if tx.send(Board::project(&source)).is_err() {
                break;
            }
            debug!(count = source.len(), "Board recomputed");
        }
    });

    rx
}
