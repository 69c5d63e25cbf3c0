use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use super::{StoreError, StoreSnapshot, StoreState, TodoStore};
use crate::clock;
use crate::demo::demo_todos;
use crate::models::{CreateTodo, Todo, UpdateTodo};
use crate::validation::{validate_create, validate_update};

/// Key the whole board is stored under.
pub const STORAGE_KEY: &str = "retrospective-board-todos";

/// Minimal string key/value storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn read(&self, key: &str) -> io::Result<Option<String>>;
    async fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn read(&self, key: &str) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, key: &str, value: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn read(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::other("storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::other("storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    async fn read(&self, key: &str) -> io::Result<Option<String>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).write(key, value).await
    }
}

/// Offline store keeping the whole board as one JSON snapshot.
///
/// Every mutation writes the full collection; observers only see the new
/// collection once the write went through. Mutations are refused until a
/// load has succeeded, so an unreadable board is never overwritten.
#[derive(Debug)]
pub struct LocalStore<S> {
    storage: S,
    state: StoreState,
    loaded: AtomicBool,
}

impl<S: KeyValueStorage> LocalStore<S> {
    /// An empty store; call [`TodoStore::refresh`] to load it.
    pub fn new(storage: S) -> Self {
        LocalStore {
            storage,
            state: StoreState::new(),
            loaded: AtomicBool::new(false),
        }
    }

    /// Loads the stored board, writing the demo board first if nothing is
    /// stored yet. A failed load is reported through the snapshot's `error`.
    pub async fn open(storage: S) -> Self {
        let store = Self::new(storage);
        if let Err(e) = store.refresh().await {
            warn!(error = %e, "Starting with an empty board");
        }
        store
    }

    async fn load(&self) -> Result<Vec<Todo>, StoreError> {
        let stored = self
            .storage
            .read(STORAGE_KEY)
            .await
            .map_err(|e| StoreError::Transport(format!("Failed to load todos from storage: {e}")))?;

        match stored {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                StoreError::Transport(format!("Failed to load todos from storage: {e}"))
            }),
            None => {
                let todos = demo_todos(clock::now());
                self.persist(&todos).await?;
                info!(count = todos.len(), "Initialized demo board");
                Ok(todos)
            }
        }
    }

    /// The collection mutations start from.
    fn current(&self) -> Result<Arc<Vec<Todo>>, StoreError> {
        if !self.loaded.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("Todos not loaded from storage".into()));
        }
        Ok(self.state.todos())
    }

    async fn persist(&self, todos: &[Todo]) -> Result<(), StoreError> {
        let json = serde_json::to_string(todos)
            .map_err(|e| StoreError::Transport(format!("Failed to save todos: {e}")))?;
        self.storage
            .write(STORAGE_KEY, &json)
            .await
            .map_err(|e| StoreError::Transport(format!("Failed to save todos: {e}")))
    }

    async fn apply_create(&self, input: CreateTodo) -> Result<Todo, StoreError> {
        let new = validate_create(input)?;
        let todo = Todo::new(Uuid::new_v4().to_string(), new, clock::now());

        let mut todos = Vec::clone(&*self.current()?);
        todos.push(todo.clone());
        self.persist(&todos).await?;
        self.state.set_todos(todos);
        Ok(todo)
    }

    async fn apply_update(&self, id: &str, input: UpdateTodo) -> Result<Todo, StoreError> {
        let patch = validate_update(input)?;

        let mut todos = Vec::clone(&*self.current()?);
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if patch.is_empty() {
            return Ok(todo.clone());
        }
        let updated_at = clock::touch(todo.updated_at);
        patch.apply(todo, updated_at);
        let todo = todo.clone();

        self.persist(&todos).await?;
        self.state.set_todos(todos);
        Ok(todo)
    }

    async fn apply_delete(&self, id: &str) -> Result<(), StoreError> {
        let current = self.current()?;
        if !current.iter().any(|t| t.id == id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let todos: Vec<Todo> = current.iter().filter(|t| t.id != id).cloned().collect();
        self.persist(&todos).await?;
        self.state.set_todos(todos);
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStorage> TodoStore for LocalStore<S> {
    fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    async fn refresh(&self) -> Result<Arc<Vec<Todo>>, StoreError> {
        let _loading = self.state.begin();
        let todos = self.load().await.map_err(|e| self.state.fail(e))?;
        self.loaded.store(true, Ordering::SeqCst);
        Ok(self.state.set_todos(todos))
    }

    async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        self.state
            .todos()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| self.state.fail(StoreError::NotFound(id.to_string())))
    }

    async fn create(&self, input: CreateTodo) -> Result<Todo, StoreError> {
        let _loading = self.state.begin();
        let todo = self
            .apply_create(input)
            .await
            .map_err(|e| self.state.fail(e))?;
        info!(id = %todo.id, category = %todo.category, "Created todo");
        Ok(todo)
    }

    async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, StoreError> {
        let _loading = self.state.begin();
        let todo = self
            .apply_update(id, input)
            .await
            .map_err(|e| self.state.fail(e))?;
        info!(id = %todo.id, completed = todo.completed, "Updated todo");
        Ok(todo)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _loading = self.state.begin();
        self.apply_delete(id)
            .await
            .map_err(|e| self.state.fail(e))?;
        info!(id, "Deleted todo");
        Ok(())
    }
}
