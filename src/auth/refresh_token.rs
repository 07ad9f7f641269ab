/// Refresh Token Issuance and Storage
///
/// Refresh tokens are opaque 256-bit random strings with no embedded
/// structure; all semantics live in the database row keyed by the token.
/// They are long-lived, revocable, and NOT rotated on use.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

const TOKEN_BYTES: usize = 32;

/// Generate a fresh opaque refresh token: 32 bytes from the OS secure
/// random source, hex-encoded to 64 characters.
///
/// # Errors
/// `AppError::EntropySource` if the secure source is unavailable. This is
/// fatal to the issuing request; there is no fallback generator.
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::EntropySource(e.to_string()))?;

    Ok(hex::encode(bytes))
}

/// A stored refresh-token row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// A token is valid iff it exists, has not been revoked, and its
    /// expiry is still ahead.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && Utc::now() < self.expires_at
    }

    /// Revoke eligibility: a token can be revoked unless it is BOTH
    /// already revoked and already expired, in which case the caller
    /// treats it as gone.
    pub fn is_revocable(&self) -> bool {
        !(self.revoked_at.is_some() && Utc::now() > self.expires_at)
    }
}

/// Persist a freshly generated refresh token for a user.
pub async fn save_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    token: &str,
    ttl_seconds: i64,
) -> Result<(), AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(ttl_seconds);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at)
        VALUES ($1, $2, $3, $3, $4)
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Point lookup by token string. `None` when the token was never issued
/// (or the owning account was deleted).
pub async fn get_refresh_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<RefreshTokenRecord>, AppError> {
    let record = sqlx::query_as::<_, RefreshTokenRecord>(
        r#"
        SELECT token, user_id, expires_at, revoked_at
        FROM refresh_tokens
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Stamp `revoked_at` on a token. Idempotent in intent: re-stamping an
/// already revoked row just moves the timestamp (last write wins).
pub async fn revoke_refresh_token(pool: &PgPool, token: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked_at = $1, updated_at = $1
        WHERE token = $2
        "#,
    )
    .bind(Utc::now())
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}
