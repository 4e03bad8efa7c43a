use std::sync::Arc;

use redis::Client as RedisClient;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restaurant_backoffice::{
    config::Config, db, routes, services::email::EmailService, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis = match config.redis_url.as_deref() {
        Some(url) => {
            let client = RedisClient::open(url)?;
            let conn = client.get_multiplexed_async_connection().await?;
            info!("Redis connected, rate limiting enabled");
            Some(conn)
        }
        None => {
            warn!("REDIS_URL not set, rate limiting disabled");
            None
        }
    };

    let email = EmailService::new(&config).map(Arc::new);
    if email.is_some() {
        info!(backend = ?config.email_backend, "Email service configured");
    } else {
        warn!("Email not configured, password reset requests will fail");
    }

    let state = AppState {
        db: pool,
        redis,
        config: config.clone(),
        email,
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Restaurant backoffice API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
