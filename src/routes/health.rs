use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "db": "unavailable" })),
            )
        }
    }
}

/// GET /: entry point listing where to authenticate.
pub async fn api_root() -> Json<Value> {
    Json(json!({
        "message": "Bienvenue sur l'API du restaurant",
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
        "login": "/login/",
        "token_refresh": "/token/refresh/",
    }))
}
