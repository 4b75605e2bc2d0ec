//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use axum::http::HeaderMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::api::auth::{
    admin_credential, client_id, AdminAuth, FixedWindowLimiter, RateLimiter, TokenAuth, Unlimited,
};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ApiSettings;
use crate::storage::{EventStore, StorageResult};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Event store every handler reads and writes through
    pub store: Arc<EventStore>,
    /// Admin credential check for writes
    pub auth: Arc<dyn AdminAuth>,
    /// Per-client request limiter
    pub limiter: Arc<dyn RateLimiter>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// State with token auth and a fixed-window limiter built from `config`
    pub fn new(store: Arc<EventStore>, config: ApiConfig) -> Self {
        let auth: Arc<dyn AdminAuth> = Arc::new(TokenAuth::new(config.admin_token.clone()));
        let limiter: Arc<dyn RateLimiter> = if config.rate_limit_per_minute == 0 {
            Arc::new(Unlimited)
        } else {
            Arc::new(FixedWindowLimiter::per_minute(config.rate_limit_per_minute))
        };
        Self::with_collaborators(store, config, auth, limiter)
    }

    pub fn with_collaborators(
        store: Arc<EventStore>,
        config: ApiConfig,
        auth: Arc<dyn AdminAuth>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            store,
            auth,
            limiter,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Reject the request if the client is over its limit
    pub fn check_rate(&self, headers: &HeaderMap) -> ApiResult<()> {
        let client = client_id(headers);
        if self.limiter.check(&client) {
            Ok(())
        } else {
            tracing::warn!(client = %client, "Rate limit exceeded");
            Err(ApiError::RateLimited)
        }
    }

    /// Reject the request unless it carries a valid admin credential
    pub fn require_admin(&self, headers: &HeaderMap) -> ApiResult<()> {
        match admin_credential(headers) {
            Some(credential) if self.auth.verify(&credential) => Ok(()),
            _ => Err(ApiError::Unauthorized),
        }
    }

    /// Run a blocking store call off the async runtime
    pub async fn with_store<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&EventStore) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins (empty allows any)
    pub cors_origins: Vec<String>,
    /// Token that grants admin access
    pub admin_token: Option<String>,
    /// Requests per client per minute (0 disables limiting)
    pub rate_limit_per_minute: u32,
    /// Directory `/images/...` URLs resolve against
    pub media_root: PathBuf,
    /// Cities accepted on create and update
    pub cities: Vec<String>,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_settings(&ApiSettings::default())
    }
}

impl ApiConfig {
    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            cors_origins: settings.cors_origins.clone(),
            admin_token: settings.admin_token.clone(),
            rate_limit_per_minute: settings.rate_limit_per_minute,
            media_root: PathBuf::from(&settings.media_root),
            cities: settings.cities.clone(),
            max_body_size: 1024 * 1024, // 1MB
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
