//! Resets the database to the seed board.

use tracing::info;
use tracing_subscriber::EnvFilter;

use retroboard::{config::Config, db, demo::SEED_TODOS};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("retroboard=info")),
        )
        .init();

    let config = Config::from_env().expect("valid configuration");
    let pool = db::init_db(&config.database_path).expect("initializing database");

    match db::seed_todos(&pool, SEED_TODOS) {
        Ok(todos) => info!(
            count = todos.len(),
            path = %config.database_path.display(),
            "Seeded retrospective items"
        ),
        Err(e) => {
            tracing::error!(error = ?e, "Seeding failed");
            std::process::exit(1);
        }
    }
}
