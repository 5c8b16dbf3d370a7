// src/config.rs

use dotenvy::dotenv;
use std::env;

/// How long an author may delete their own post after creating it.
const DEFAULT_DELETE_WINDOW_SECS: i64 = 600;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub delete_window_secs: i64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:board.db".to_string());

        let delete_window_secs = env::var("DELETE_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DELETE_WINDOW_SECS);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            delete_window_secs,
            rust_log,
        }
    }
}
