use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{ApiJson, AppError, AppResult},
    middleware::rate_limit::check_rate_limit,
    models::password_reset::{PasswordResetConfirmRequest, PasswordResetRequest},
    services::password_reset::PasswordResetService,
    AppState,
};

/// POST /password-reset/ (public)
///
/// Known and unknown addresses get a 200 either way so the endpoint cannot
/// reveal which accounts exist.
pub async fn request_reset(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PasswordResetRequest>,
) -> AppResult<Json<Value>> {
    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("Email requis".into()))?;

    // Rate limit: 5 requests per hour per email
    let rate_key = format!("rate:password-reset:{}", email.to_lowercase());
    check_rate_limit(state.redis.as_ref(), &rate_key, 5, 3600).await?;

    PasswordResetService::request_reset(
        &state.db,
        state.email.as_deref(),
        email,
        &state.config.frontend_url,
        state.config.reset_token_validity_seconds,
    )
    .await?;

    Ok(Json(json!({ "message": "Si cet email existe, un lien a été envoyé." })))
}

/// POST /password-reset/{user_id}/{token}/ (public)
pub async fn confirm_reset(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(i64, String)>,
    ApiJson(body): ApiJson<PasswordResetConfirmRequest>,
) -> AppResult<Json<Value>> {
    let new_password = body
        .new_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Mot de passe requis".into()))?;

    PasswordResetService::confirm_reset(&state.db, user_id, &token, new_password).await?;
    Ok(Json(json!({ "message": "Votre mot de passe a été mis à jour." })))
}
