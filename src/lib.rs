pub mod board;
pub mod category;
pub mod clock;
pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::get,
    Router,
};
use db::DbPool;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub base_path: Arc<String>,
    pub cors_origin: Option<HeaderValue>,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        AppState {
            db,
            base_path: Arc::new(String::new()),
            cors_origin: None,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let base_path = state.base_path.clone();
    let cors = state.cors_origin.clone().map(|origin| {
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    });

    let mut app_routes = Router::new()
        .route("/api/health", get(handlers::board::health))
        .route("/api/board", get(handlers::board::board))
        .route("/api/board/plain", get(handlers::board::plain_text_board))
        .route(
            "/api/todos",
            get(handlers::api::list_all_todos).post(handlers::api::create_new_todo),
        )
        .route(
            "/api/todos/{id}",
            get(handlers::api::get_single_todo)
                .put(handlers::api::update_existing_todo)
                .delete(handlers::api::delete_existing_todo),
        )
        .layer(
            tower::ServiceBuilder::new()
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower_http::compression::CompressionLayer::new()),
        )
        .with_state(state);

    if let Some(cors) = cors {
        app_routes = app_routes.layer(cors);
    }

    tracing::info!("base_path: {base_path:?}");

    if base_path.is_empty() {
        app_routes
    } else {
        Router::new().nest(&*base_path, app_routes)
    }
}
