use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use retroboard::{config::Config, create_app, db, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("retroboard=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("valid configuration");

    let db = db::init_db(&config.database_path).expect("initializing database");
    info!(path = %config.database_path.display(), "Opened database");

    let state = AppState {
        db,
        base_path: Arc::new(config.base_path),
        cors_origin: config.cors_origin,
    };
    let app = create_app(state);
    let addr = (Ipv4Addr::UNSPECIFIED, config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to port {}: {e}", config.port));

    info!("running on {addr:?}");

    axum::serve(listener, app).await.expect("failed serving");
}
