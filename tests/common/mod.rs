#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use restaurant_backoffice::config::{Config, EmailBackend};
use restaurant_backoffice::models::user::User;
use restaurant_backoffice::routes;
use restaurant_backoffice::services::auth::AuthService;
use restaurant_backoffice::services::email::EmailService;
use restaurant_backoffice::AppState;

pub const ADMIN_PASSWORD: &str = "admin_password_123!";

/// Build a test `Config` with safe defaults. Redis is left unset so rate
/// limiting is skipped.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        redis_url: None,
        jwt_secret: "test-jwt-secret".into(),
        jwt_refresh_secret: "test-refresh-secret".into(),
        jwt_expiry_seconds: 300,
        jwt_refresh_expiry_days: 1,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:5173".into(),
        cors_allowed_origins: vec!["http://localhost:5173".into()],
        reset_token_validity_seconds: 3600,
        email_backend: EmailBackend::Stub,
        smtp_host: None,
        smtp_port: None,
        smtp_username: None,
        smtp_password: None,
        smtp_from: None,
    }
}

/// The application router backed by `pool`, plus the stub mailer it uses.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<EmailService>,
}

pub fn build_test_app(pool: PgPool) -> TestApp {
    build_app_with_mailer(pool, false)
}

/// Same as [`build_test_app`] but every email send fails.
pub fn build_test_app_with_failing_mail(pool: PgPool) -> TestApp {
    build_app_with_mailer(pool, true)
}

fn build_app_with_mailer(pool: PgPool, failing: bool) -> TestApp {
    let mailer = Arc::new(EmailService::stub(
        "noreply@restaurant.local".parse().unwrap(),
        failing,
    ));
    let state = AppState {
        db: pool,
        redis: None,
        config: Arc::new(test_config()),
        email: Some(mailer.clone()),
    };
    TestApp {
        router: routes::router(state),
        mailer,
    }
}

pub async fn create_user(pool: &PgPool, username: &str, email: &str, is_staff: bool) -> User {
    let hash = AuthService::hash_password(ADMIN_PASSWORD).expect("hashing should succeed");
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, is_staff)
         VALUES ($1, $2, $3, $4)
         RETURNING id, username, email, password_hash, is_staff, is_active, date_joined",
    )
    .bind(username)
    .bind(email)
    .bind(hash)
    .bind(is_staff)
    .fetch_one(pool)
    .await
    .expect("user creation should succeed")
}

/// A signed access token for `user`, as `/login/` would return it.
pub fn access_token_for(user: &User) -> String {
    let config = test_config();
    AuthService::generate_access_token(user, &config.jwt_secret, config.jwt_expiry_seconds)
        .expect("token generation should succeed")
}

/// Create a staff user and return a bearer token for it.
pub async fn admin_token(pool: &PgPool) -> String {
    let admin = create_user(pool, "admin", "admin@restaurant.test", true).await;
    access_token_for(&admin)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
