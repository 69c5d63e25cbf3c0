//! Client-side todo stores.
//!
//! Two implementations share the [`TodoStore`] capability set: [`RemoteStore`]
//! talks to the HTTP API and [`LocalStore`] keeps the board in a key/value
//! storage for offline use. Both publish their state through a
//! [`tokio::sync::watch`] channel so views can follow `todos`, `loading` and
//! `error` without polling.

pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

use crate::models::{CreateTodo, Todo, UpdateTodo};
use crate::validation::ValidationError;

pub use local::{FileStorage, KeyValueStorage, LocalStore, MemoryStorage, STORAGE_KEY};
pub use remote::RemoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Todo {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Transport(String),
}

/// What a store currently holds.
///
/// `todos` is replaced wholesale on every change, so two snapshots with the
/// same `Arc` carry the same collection.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub todos: Arc<Vec<Todo>>,
    pub loading: bool,
    pub error: Option<String>,
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<StoreSnapshot>;

    fn snapshot(&self) -> StoreSnapshot {
        let rx = self.subscribe();
        let snapshot = rx.borrow().clone();
        snapshot
    }

    /// Re-reads the whole collection. On failure the previous collection is
    /// kept.
    async fn refresh(&self) -> Result<Arc<Vec<Todo>>, StoreError>;

    async fn get(&self, id: &str) -> Result<Todo, StoreError>;

    async fn create(&self, input: CreateTodo) -> Result<Todo, StoreError>;

    async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Flips `completed`. Ids missing from the current collection are
    /// ignored and yield `Ok(None)`, unlike [`TodoStore::update`].
    async fn toggle(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let current = self
            .snapshot()
            .todos
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.completed);
        let Some(completed) = current else {
            return Ok(None);
        };
        self.update(id, UpdateTodo::completed(!completed))
            .await
            .map(Some)
    }
}

/// Observable state shared by both store implementations.
#[derive(Debug)]
pub(crate) struct StoreState {
    tx: watch::Sender<StoreSnapshot>,
}

impl StoreState {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(StoreSnapshot::default());
        StoreState { tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    pub(crate) fn todos(&self) -> Arc<Vec<Todo>> {
        Arc::clone(&self.tx.borrow().todos)
    }

    /// Marks an operation as in flight. `loading` drops back to `false` when
    /// the returned guard goes out of scope, whatever the outcome.
    pub(crate) fn begin(&self) -> LoadingGuard<'_> {
        self.tx.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        LoadingGuard { state: self }
    }

    pub(crate) fn set_todos(&self, todos: Vec<Todo>) -> Arc<Vec<Todo>> {
        let todos = Arc::new(todos);
        self.tx.send_modify(|s| s.todos = Arc::clone(&todos));
        todos
    }

    /// Records `err` for observers and hands it back to the caller.
    pub(crate) fn fail(&self, err: StoreError) -> StoreError {
        warn!(error = %err, "Store operation failed");
        let message = err.to_string();
        self.tx.send_modify(|s| s.error = Some(message));
        err
    }
}

pub(crate) struct LoadingGuard<'a> {
    state: &'a StoreState,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.tx.send_modify(|s| s.loading = false);
    }
}
