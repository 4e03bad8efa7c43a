use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        auth::{Claims, RefreshClaims},
        user::{AccessToken, TokenPair, User},
    },
};

const BCRYPT_COST: u32 = 12;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_staff, is_active, date_joined";

pub struct AuthService;

impl AuthService {
    /// Verify credentials and issue an access/refresh pair.
    ///
    /// Unknown users, inactive users and wrong passwords share one error.
    pub async fn login(
        pool: &PgPool,
        username: &str,
        password: &str,
        jwt_secret: &str,
        refresh_secret: &str,
        access_ttl: u64,
        refresh_ttl_days: u64,
    ) -> AppResult<TokenPair> {
        let invalid = || AppError::Unauthorized("Identifiants invalides");

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_active = TRUE"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(invalid)?;

        let valid = bcrypt::verify(password, &user.password_hash).map_err(|_| invalid())?;
        if !valid {
            tracing::info!(username, "Rejected login attempt");
            return Err(invalid());
        }

        let access = Self::generate_access_token(&user, jwt_secret, access_ttl)?;
        let refresh = Self::generate_refresh_token(user.id, refresh_secret, refresh_ttl_days)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a refresh token for a new access token. The user is re-read
    /// so deactivation and staff changes apply immediately.
    pub async fn refresh(
        pool: &PgPool,
        refresh_token: &str,
        jwt_secret: &str,
        refresh_secret: &str,
        access_ttl: u64,
    ) -> AppResult<AccessToken> {
        let invalid = || AppError::Unauthorized("Token invalide ou expiré");

        let key = DecodingKey::from_secret(refresh_secret.as_bytes());
        let data = decode::<RefreshClaims>(refresh_token, &key, &Validation::new(Algorithm::HS256))
            .map_err(|_| invalid())?;
        let user_id: i64 = data.claims.sub.parse().map_err(|_| invalid())?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(invalid)?;

        let access = Self::generate_access_token(&user, jwt_secret, access_ttl)?;
        Ok(AccessToken { access })
    }

    pub fn generate_access_token(user: &User, secret: &str, ttl_seconds: u64) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_staff: user.is_staff,
            iat: now,
            exp: now + ttl_seconds as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    fn generate_refresh_token(user_id: i64, secret: &str, ttl_days: u64) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + (ttl_days * 86400) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn hash_password(password: &str) -> anyhow::Result<String> {
        Ok(bcrypt::hash(password, BCRYPT_COST)?)
    }

    /// Create a staff account, or promote and re-password an existing one.
    pub async fn upsert_admin(
        pool: &PgPool,
        username: &str,
        email: &str,
        password: &str,
    ) -> anyhow::Result<User> {
        let password_hash = Self::hash_password(password)?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, is_staff, is_active)
             VALUES ($1, $2, $3, TRUE, TRUE)
             ON CONFLICT (username) DO UPDATE SET
                 email = EXCLUDED.email,
                 password_hash = EXCLUDED.password_hash,
                 is_staff = TRUE,
                 is_active = TRUE
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }
}
