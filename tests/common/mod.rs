use std::sync::Arc;

use axum::http::HeaderValue;
use reqwest::Client;
use tokio::net::TcpListener;

use retroboard::{create_app, db, db::DbPool, AppState};

pub struct TestServer {
    pub addr: String,
    pub client: Client,
    pub db: DbPool,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_base_path("").await
    }

    pub async fn with_base_path(base_path: &str) -> Self {
        Self::start(|state| state.base_path = Arc::new(base_path.to_string())).await
    }

    #[allow(dead_code)]
    pub async fn with_cors_origin(origin: &'static str) -> Self {
        Self::start(|state| state.cors_origin = Some(HeaderValue::from_static(origin))).await
    }

    async fn start(configure: impl FnOnce(&mut AppState)) -> Self {
        let db = db::open_in_memory().expect("Failed to create in-memory database");

        let mut state = AppState::new(db.clone());
        configure(&mut state);
        let app = create_app(state);

        // Bind to random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            client: Client::new(),
            db,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Moves a todo's `created_at` by `micros` so ordering tests do not
    /// depend on two inserts landing on different clock ticks.
    #[allow(dead_code)]
    pub fn shift_created_at(&self, id: &str, micros: i64) {
        self.db
            .lock()
            .unwrap()
            .execute(
                "UPDATE todos SET created_at = created_at + ?1 WHERE id = ?2",
                rusqlite::params![micros, id],
            )
            .unwrap();
    }

    /// Makes every query against the todos table fail.
    #[allow(dead_code)]
    pub fn break_database(&self) {
        self.db
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE todos")
            .unwrap();
    }
}
