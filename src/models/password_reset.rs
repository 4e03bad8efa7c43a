use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::FromRow;

/// Validity window stamped on new tokens unless configured otherwise.
pub const DEFAULT_TOKEN_VALIDITY_SECONDS: i32 = 3600;

/// A stored reset token. Only the SHA-256 digest of the emailed value is kept.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    /// Validity window in seconds.
    pub expires_in: i32,
}

impl PasswordResetToken {
    /// A token is usable while its age is strictly below the validity window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < Duration::seconds(i64::from(self.expires_in))
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub new_password: Option<String>,
}
