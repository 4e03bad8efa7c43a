// Library exports for the server, binary tools and tests
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use config::Config;
use services::email::EmailService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Throttle store; rate limiting is skipped when absent.
    pub redis: Option<redis::aio::MultiplexedConnection>,
    pub config: Arc<Config>,
    pub email: Option<Arc<EmailService>>,
}
