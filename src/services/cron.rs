/// Expiry sweep for password reset tokens.
/// Schedule: run periodically (e.g., hourly via cron job: 0 * * * * /app/purge-tokens)
///
/// A token is expired once its age reaches its own validity window
/// (`expires_in` seconds after `created_at`).

use sqlx::PgPool;

pub struct CronService;

impl CronService {
    /// Number of stored tokens that can no longer be redeemed.
    pub async fn count_expired_tokens(pool: &PgPool) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM password_reset_tokens
             WHERE created_at + make_interval(secs => expires_in) <= NOW()",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Delete every expired token and return how many rows went away.
    pub async fn purge_expired_tokens(pool: &PgPool) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "DELETE FROM password_reset_tokens
             WHERE created_at + make_interval(secs => expires_in) <= NOW()",
        )
        .execute(pool)
        .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::info!("Purged {} expired password reset tokens", purged);
        }
        Ok(purged)
    }
}
