use std::env;

use crate::models::password_reset::DEFAULT_TOKEN_VALIDITY_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailBackend {
    Smtp,
    /// Messages are kept in memory and logged, nothing leaves the process.
    Stub,
}

impl std::str::FromStr for EmailBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(EmailBackend::Smtp),
            "stub" => Ok(EmailBackend::Stub),
            other => Err(anyhow::anyhow!("Unknown EMAIL_BACKEND: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub jwt_expiry_seconds: u64,
    pub jwt_refresh_expiry_days: u64,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub reset_token_validity_seconds: i32,
    pub email_backend: EmailBackend,
    // SMTP (optional)
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: optional("REDIS_URL"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            jwt_expiry_seconds: env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "300".into())
                .parse()?,
            jwt_refresh_expiry_days: env::var("JWT_REFRESH_EXPIRY_DAYS")
                .unwrap_or_else(|_| "1".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "https://restaurant-front.onrender.com".into()),
            cors_allowed_origins: split_origins(
                &env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            reset_token_validity_seconds: match optional("RESET_TOKEN_VALIDITY_SECONDS") {
                Some(raw) => parse_validity_seconds(&raw)?,
                None => DEFAULT_TOKEN_VALIDITY_SECONDS,
            },
            email_backend: env::var("EMAIL_BACKEND")
                .unwrap_or_else(|_| "smtp".into())
                .parse()?,
            smtp_host: optional("SMTP_HOST"),
            smtp_port: env::var("SMTP_PORT").ok().and_then(|v| v.parse().ok()),
            smtp_username: optional("SMTP_USERNAME"),
            smtp_password: optional("SMTP_PASSWORD"),
            smtp_from: optional("SMTP_FROM"),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Reset token lifetime; must be a positive number of seconds.
fn parse_validity_seconds(raw: &str) -> anyhow::Result<i32> {
    let seconds: i32 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("RESET_TOKEN_VALIDITY_SECONDS must be an integer, got {raw:?}"))?;
    if seconds <= 0 {
        anyhow::bail!("RESET_TOKEN_VALIDITY_SECONDS must be positive, got {seconds}");
    }
    Ok(seconds)
}

/// Comma-separated origin list; blanks and trailing slashes are dropped.
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
