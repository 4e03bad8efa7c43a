use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::services::schedule_rules;

/// Postgres SQLSTATE for exclusion constraint violations.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Error type shared by every handler and service.
///
/// Client-facing variants carry French messages. `Database`, `Internal` and
/// `EmailDelivery` are logged with full detail and answered with a generic
/// 500 body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("invalid payload: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Accès refusé")]
    Forbidden,

    #[error("Ressource introuvable")]
    NotFound,

    #[error("Token invalide ou expiré")]
    InvalidResetToken,

    #[error("Trop de tentatives. Réessayez plus tard.")]
    TooManyRequests,

    #[error("email delivery failed: {0}")]
    EmailDelivery(anyhow::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "fields": { field: [message] } }),
            ),
            AppError::Invalid(errors) => (StatusCode::BAD_REQUEST, validation_body(&errors)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            e @ AppError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": e.to_string() })),
            e @ AppError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": e.to_string() })),
            e @ AppError::InvalidResetToken => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            e @ AppError::TooManyRequests => {
                (StatusCode::TOO_MANY_REQUESTS, json!({ "error": e.to_string() }))
            }
            AppError::EmailDelivery(e) => {
                tracing::error!(error = ?e, "Email delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Une erreur est survenue lors de l'envoi de l'email." }),
                )
            }
            AppError::Database(e) => return classify_sqlx_error(e).into_response(),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error");
                internal_body()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal_body() -> (StatusCode, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Une erreur interne est survenue." }),
    )
}

/// Map a sqlx error to a response. Overlapping schedules rejected by the
/// exclusion constraint answer exactly like the application-level check.
fn classify_sqlx_error(err: sqlx::Error) -> Response {
    match &err {
        sqlx::Error::RowNotFound => AppError::NotFound.into_response(),
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) =>
        {
            schedule_rules::overlap_error().into_response()
        }
        _ => {
            tracing::error!(error = %err, "Database error");
            let (status, body) = internal_body();
            (status, Json(body)).into_response()
        }
    }
}

fn validation_body(errors: &validator::ValidationErrors) -> Value {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Valeur invalide ({})", e.code))
            })
            .collect();
        fields.insert(field.to_string(), messages);
    }
    json!({ "error": "Données invalides", "fields": fields })
}

/// `Json` extractor whose rejection is an [`AppError`], so malformed bodies
/// answer with the same JSON error shape as everything else.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
