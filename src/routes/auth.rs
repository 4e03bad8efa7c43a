use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::{ApiJson, AppResult},
    models::{
        auth::AdminUser,
        user::{AccessToken, LoginRequest, RefreshTokenRequest, TokenPair},
    },
    services::auth::AuthService,
    AppState,
};

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    AuthService::login(
        &state.db,
        &body.username,
        &body.password,
        &state.config.jwt_secret,
        &state.config.jwt_refresh_secret,
        state.config.jwt_expiry_seconds,
        state.config.jwt_refresh_expiry_days,
    )
    .await
    .map(Json)
}

pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshTokenRequest>,
) -> AppResult<Json<AccessToken>> {
    AuthService::refresh(
        &state.db,
        &body.refresh,
        &state.config.jwt_secret,
        &state.config.jwt_refresh_secret,
        state.config.jwt_expiry_seconds,
    )
    .await
    .map(Json)
}

/// GET /check-admin/: only reachable with a staff token.
pub async fn check_admin(_admin: AdminUser) -> Json<Value> {
    Json(json!({ "is_admin": true }))
}
