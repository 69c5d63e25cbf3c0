use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::clock;
use crate::demo::SeedTodo;
use crate::error::AppError;
use crate::models::{NewTodo, Todo, TodoPatch};

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS todos (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        category TEXT NOT NULL CHECK (category IN ('START_DOING', 'DO_DIFFERENTLY', 'KEEP_DOING')),
        completed INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS todos_created_at ON todos (created_at);
";

const TODO_COLUMNS: &str = "id, title, description, category, completed, created_at, updated_at";

pub fn init_db(path: &Path) -> Result<DbPool> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn open_in_memory() -> Result<DbPool> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn lock(pool: &DbPool) -> Result<MutexGuard<'_, Connection>, AppError> {
    pool.lock()
        .map_err(|_| AppError::Database("database lock poisoned".to_string()))
}

fn row_to_todo(row: &Row<'_>) -> Result<Todo> {
    let timestamp = |idx: usize| -> Result<OffsetDateTime> {
        let micros: i64 = row.get(idx)?;
        clock::from_micros(micros)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
    };

    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        completed: row.get::<_, i32>(4)? != 0,
        created_at: timestamp(5)?,
        updated_at: timestamp(6)?,
    })
}

fn insert(conn: &Connection, todo: &Todo) -> Result<()> {
    conn.execute(
        "INSERT INTO todos (id, title, description, category, completed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            todo.id,
            todo.title,
            todo.description,
            todo.category,
            todo.completed,
            clock::to_micros(todo.created_at),
            clock::to_micros(todo.updated_at),
        ],
    )?;
    Ok(())
}

fn get_todo_internal(conn: &Connection, id: &str) -> Result<Option<Todo>> {
    conn.query_row(
        &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
        [id],
        row_to_todo,
    )
    .optional()
}

pub fn create_todo(pool: &DbPool, new: &NewTodo) -> Result<Todo, AppError> {
    let conn = lock(pool)?;
    let todo = Todo::new(Uuid::new_v4().to_string(), new.clone(), clock::now());
    insert(&conn, &todo)?;
    Ok(todo)
}

/// All todos, newest first.
pub fn list_todos(pool: &DbPool) -> Result<Vec<Todo>, AppError> {
    let conn = lock(pool)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC"
    ))?;
    let todos = stmt
        .query_map([], row_to_todo)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(todos)
}

pub fn get_todo(pool: &DbPool, id: &str) -> Result<Option<Todo>, AppError> {
    let conn = lock(pool)?;
    Ok(get_todo_internal(&conn, id)?)
}

/// Applies `patch` to the todo with `id`. Returns `None` when it does not
/// exist; an empty patch returns the record unchanged.
pub fn update_todo(pool: &DbPool, id: &str, patch: &TodoPatch) -> Result<Option<Todo>, AppError> {
    let conn = lock(pool)?;

    let Some(mut todo) = get_todo_internal(&conn, id)? else {
        return Ok(None);
    };
    if patch.is_empty() {
        return Ok(Some(todo));
    }

    let updated_at = clock::touch(todo.updated_at);
    patch.apply(&mut todo, updated_at);
    conn.execute(
        "UPDATE todos SET title = ?1, description = ?2, category = ?3, completed = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            todo.title,
            todo.description,
            todo.category,
            todo.completed,
            clock::to_micros(todo.updated_at),
            todo.id,
        ],
    )?;

    Ok(Some(todo))
}

pub fn delete_todo(pool: &DbPool, id: &str) -> Result<bool, AppError> {
    let conn = lock(pool)?;
    let rows = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
    Ok(rows > 0)
}

/// Replaces the whole table with `items`, oldest first.
pub fn seed_todos(pool: &DbPool, items: &[SeedTodo]) -> Result<Vec<Todo>, AppError> {
    let mut conn = lock(pool)?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM todos", [])?;

    let mut created = Vec::with_capacity(items.len());
    let mut previous = None;
    for item in items {
        let now = match previous {
            Some(previous) => clock::touch(previous),
            None => clock::now(),
        };
        let mut todo = Todo::new(Uuid::new_v4().to_string(), item.to_new_todo(), now);
        todo.completed = item.completed;
        insert(&tx, &todo)?;
        previous = Some(now);
        created.push(todo);
    }

    tx.commit()?;
    Ok(created)
}
