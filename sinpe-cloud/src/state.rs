//! Application state for sinpe-cloud

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::{JwtConfig, JwtService};
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Session and API token service
    pub jwt: Arc<JwtService>,
    /// Loaded configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let jwt = JwtService::with_config(JwtConfig::from(&config));
        Self {
            pool,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}
