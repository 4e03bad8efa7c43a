use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgExecutor, PgPool};

use crate::{
    error::{AppError, AppResult},
    models::password_reset::PasswordResetToken,
    services::{auth::AuthService, email::EmailService},
};

/// Length of the emailed token, alphanumeric.
pub const RESET_TOKEN_LENGTH: usize = 64;

/// What happened to a reset request. Callers answer both the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequestOutcome {
    Sent,
    UnknownEmail,
}

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Tokens are stored as a hex SHA-256 digest, never in clear.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn build_reset_url(frontend_url: &str, user_id: i64, token: &str) -> String {
    format!(
        "{}/reset-password/{user_id}/{token}/",
        frontend_url.trim_end_matches('/')
    )
}

pub struct PasswordResetService;

impl PasswordResetService {
    /// Email a reset link to the account registered under `email`.
    ///
    /// The token row is written only after the mail transport accepted the
    /// message, so an undeliverable token never exists.
    pub async fn request_reset(
        pool: &PgPool,
        email_svc: Option<&EmailService>,
        email: &str,
        frontend_url: &str,
        validity_seconds: i32,
    ) -> AppResult<ResetRequestOutcome> {
        // Checked before mailing: the store would refuse the row afterwards.
        if validity_seconds <= 0 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Invalid reset token validity: {validity_seconds}s"
            )));
        }

        let user: Option<(i64, String)> = sqlx::query_as(
            "SELECT id, username FROM users
             WHERE email = $1 AND is_active = TRUE
             ORDER BY id LIMIT 1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        let Some((user_id, username)) = user else {
            tracing::debug!("Password reset requested for an unknown email");
            return Ok(ResetRequestOutcome::UnknownEmail);
        };

        let email_svc = email_svc.ok_or_else(|| {
            AppError::EmailDelivery(anyhow::anyhow!("Email service not configured"))
        })?;

        let token = generate_token();
        let reset_url = build_reset_url(frontend_url, user_id, &token);

        email_svc
            .send_password_reset(email, &username, &reset_url, validity_seconds)
            .await
            .map_err(AppError::EmailDelivery)?;

        let mut tx = pool.begin().await?;
        Self::store_token(&mut *tx, user_id, &token, validity_seconds).await?;
        tx.commit().await?;

        tracing::info!(user_id, "Password reset email sent");
        Ok(ResetRequestOutcome::Sent)
    }

    /// Persist the digest of `token` for `user_id`.
    pub async fn store_token<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
        token: &str,
        validity_seconds: i32,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_in)
             VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(validity_seconds)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Redeem `token` for `user_id` and set `new_password`.
    ///
    /// Absent, mismatched and expired tokens all fail with the same error.
    /// Expired rows stay in place; the purge job removes them.
    pub async fn confirm_reset(
        pool: &PgPool,
        user_id: i64,
        token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let stored = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token_hash, created_at, expires_in
             FROM password_reset_tokens
             WHERE token_hash = $1 AND user_id = $2",
        )
        .bind(hash_token(token))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::InvalidResetToken)?;

        if !stored.is_valid_at(Utc::now()) {
            tracing::info!(user_id, "Expired password reset token presented");
            return Err(AppError::InvalidResetToken);
        }

        let password_hash = AuthService::hash_password(new_password)?;

        let mut tx = pool.begin().await?;
        // Claim the token before touching the password: of two concurrent
        // redemptions only one deletes the row.
        let claimed: Option<i64> =
            sqlx::query_scalar("DELETE FROM password_reset_tokens WHERE id = $1 RETURNING id")
                .bind(stored.id)
                .fetch_optional(&mut *tx)
                .await?;
        if claimed.is_none() {
            return Err(AppError::InvalidResetToken);
        }
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(user_id, "Password updated through reset token");
        Ok(())
    }
}
