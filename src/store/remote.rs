use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{StoreError, StoreSnapshot, StoreState, TodoStore};
use crate::models::{CreateTodo, Todo, UpdateTodo};
use crate::validation::{validate_create, validate_update, ValidationError};

/// Store backed by the retroboard HTTP API.
///
/// `base_url` is the API root, e.g. `http://localhost:3000/api`; todos live
/// under `{base_url}/todos`.
#[derive(Debug)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    state: StoreState,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        RemoteStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            state: StoreState::new(),
        }
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: &str) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    async fn fetch_all(&self) -> Result<Vec<Todo>, StoreError> {
        let response = self
            .client
            .get(self.todos_url())
            .send()
            .await
            .map_err(transport)?;
        check(response, None).await?.json().await.map_err(transport)
    }

    async fn fetch_one(&self, id: &str) -> Result<Todo, StoreError> {
        let response = self
            .client
            .get(self.todo_url(id))
            .send()
            .await
            .map_err(transport)?;
        check(response, Some(id)).await?.json().await.map_err(transport)
    }

    async fn submit_create(&self, input: CreateTodo) -> Result<Todo, StoreError> {
        let new = validate_create(input)?;
        let response = self
            .client
            .post(self.todos_url())
            .json(&new)
            .send()
            .await
            .map_err(transport)?;
        check(response, None).await?.json().await.map_err(transport)
    }

    async fn submit_update(&self, id: &str, input: UpdateTodo) -> Result<Todo, StoreError> {
        let patch = validate_update(input)?;
        let response = self
            .client
            .put(self.todo_url(id))
            .json(&UpdateTodo::from(&patch))
            .send()
            .await
            .map_err(transport)?;
        check(response, Some(id)).await?.json().await.map_err(transport)
    }

    async fn submit_delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.todo_url(id))
            .send()
            .await
            .map_err(transport)?;
        check(response, Some(id)).await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for RemoteStore {
    fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    async fn refresh(&self) -> Result<Arc<Vec<Todo>>, StoreError> {
        let _loading = self.state.begin();
        let todos = self.fetch_all().await.map_err(|e| self.state.fail(e))?;
        info!(count = todos.len(), "Loaded todos from API");
        Ok(self.state.set_todos(todos))
    }

    async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        let _loading = self.state.begin();
        self.fetch_one(id).await.map_err(|e| self.state.fail(e))
    }

    async fn create(&self, input: CreateTodo) -> Result<Todo, StoreError> {
        let _loading = self.state.begin();
        let todo = self
            .submit_create(input)
            .await
            .map_err(|e| self.state.fail(e))?;

        let mut todos: Vec<Todo> = self
            .state
            .todos()
            .iter()
            .filter(|t| t.id != todo.id)
            .cloned()
            .collect();
        todos.push(todo.clone());
        self.state.set_todos(todos);

        info!(id = %todo.id, category = %todo.category, "Created todo");
        Ok(todo)
    }

    async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, StoreError> {
        let _loading = self.state.begin();
        let todo = self
            .submit_update(id, input)
            .await
            .map_err(|e| self.state.fail(e))?;

        let todos = self
            .state
            .todos()
            .iter()
            .map(|t| if t.id == todo.id { todo.clone() } else { t.clone() })
            .collect();
        self.state.set_todos(todos);

        info!(id = %todo.id, completed = todo.completed, "Updated todo");
        Ok(todo)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _loading = self.state.begin();
        self.submit_delete(id)
            .await
            .map_err(|e| self.state.fail(e))?;

        let todos = self
            .state
            .todos()
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();
        self.state.set_todos(todos);

        info!(id, "Deleted todo");
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

/// Turns a non-2xx response into the matching [`StoreError`], using the
/// API's `{"error": ...}` message when there is one.
async fn check(response: Response, id: Option<&str>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("Request failed with status {status}"),
    };
    debug!(%status, %message, "API rejected request");

    Err(match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(id.unwrap_or_default().to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ValidationError::Rejected(message).into()
        }
        _ => StoreError::Transport(message),
    })
}
