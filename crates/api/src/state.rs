//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::auth::{JwtManager, TokenBlacklist};
use crate::config::Config;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt_manager: JwtManager,
    pub blacklist: TokenBlacklist,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        let jwt_manager = JwtManager::new(&config.jwt_secret, config.jwt_expiry_hours);
        let blacklist = TokenBlacklist::new(Duration::from_secs(config.blacklist_sweep_secs));

        Self {
            pool,
            config: Arc::new(config),
            jwt_manager,
            blacklist,
        }
    }
}
