//! Application state management

use crate::auth::{AuthService, JwtConfig};
use crate::store::{FoodLogStore, MemoryStore, SurrealStore, UserStore};
use cq_core::config::AppConfig;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Token settings used by the auth middleware
    pub jwt: JwtConfig,
    /// Credential store
    pub users: Arc<dyn UserStore>,
    /// Food log store
    pub food_logs: Arc<dyn FoodLogStore>,
    /// Registration and login
    pub auth: AuthService,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state over the given stores
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        food_logs: Arc<dyn FoodLogStore>,
    ) -> Self {
        Self {
            jwt: JwtConfig::from(&config.auth),
            auth: AuthService::new(users.clone(), &config.auth),
            config,
            users,
            food_logs,
            start_time: Instant::now(),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }

    /// Open the store selected by `config.database.url`
    pub async fn connect(config: AppConfig) -> cq_core::Result<Self> {
        if config.database.is_memory() {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            let state = Self::in_memory(config);
            state.warm_up().await;
            return Ok(state);
        }

        let store = Arc::new(SurrealStore::connect(&config.database).await?);
        store.init_schema().await?;

        let state = Self::new(config, store.clone(), store);
        state.warm_up().await;
        Ok(state)
    }

    /// Precompute the login decoy hash; a failure here is retried on first use
    async fn warm_up(&self) {
        if let Err(e) = self.auth.warm_up().await {
            tracing::warn!(error = ?e, "Failed to precompute login decoy hash");
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
