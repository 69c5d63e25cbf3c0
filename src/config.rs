use std::path::PathBuf;

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    /// Empty, or a path with a leading and no trailing slash.
    pub base_path: String,
    pub cors_origin: Option<HeaderValue>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RETROBOARD_PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("RETROBOARD_CORS_ORIGIN is not a valid header value: {0:?}")]
    InvalidCorsOrigin(String),
}

impl Config {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_DATABASE: &'static str = "retroboard.db";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("RETROBOARD_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => Self::DEFAULT_PORT,
        };

        let database_path = lookup("RETROBOARD_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DATABASE));

        let base_path = lookup("RETROBOARD_BASE_PATH")
            .map(|path| normalize_base_path(&path))
            .unwrap_or_default();

        let cors_origin = match lookup("RETROBOARD_CORS_ORIGIN").filter(|o| !o.is_empty()) {
            Some(raw) => Some(
                HeaderValue::from_str(&raw).map_err(|_| ConfigError::InvalidCorsOrigin(raw))?,
            ),
            None => None,
        };

        Ok(Config {
            port,
            database_path,
            base_path,
            cors_origin,
        })
    }
}

fn normalize_base_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
