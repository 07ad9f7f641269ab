/// Session Lifecycle
///
/// Login, refresh, and revoke. This is the auth state machine: a refresh
/// token is Active until it is revoked (a write) or expires (derived from
/// the clock, no write). Access tokens are minted here with the configured
/// 1-hour window and are never tracked server-side.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    bearer_token, generate_refresh_token, get_refresh_token, issue_access_token,
    revoke_refresh_token, save_refresh_token, verify_password,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub is_chirpy_red: bool,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Password check, then a fresh access token plus a persisted refresh
/// token. Unknown email and wrong password produce the same 401 so the
/// response does not confirm which accounts exist.
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>, String, String, bool)>(
        r#"
        SELECT id, created_at, updated_at, email, hashed_password, is_chirpy_red
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&form.email)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    let (user_id, created_at, updated_at, email, hashed_password, is_chirpy_red) = row;

    if !verify_password(&form.password, &hashed_password)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = issue_access_token(
        user_id,
        &auth_settings.token_secret,
        auth_settings.access_token_ttl_seconds,
    )?;

    let refresh_token = generate_refresh_token()?;
    save_refresh_token(
        pool.get_ref(),
        user_id,
        &refresh_token,
        auth_settings.refresh_token_ttl_seconds,
    )
    .await?;

    tracing::info!(user_id = %user_id, "user logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user_id.to_string(),
        created_at: created_at.to_rfc3339(),
        updated_at: updated_at.to_rfc3339(),
        email,
        is_chirpy_red,
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// The bearer credential here is the REFRESH token. A valid one mints a new
/// access token for its owner; the refresh token itself is not rotated or
/// re-issued. Absent, revoked, and expired all answer the same 401.
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;

    let record = get_refresh_token(pool.get_ref(), &token)
        .await?
        .ok_or(AppError::Auth(AuthError::RefreshTokenInvalid))?;

    if !record.is_active() {
        return Err(AuthError::RefreshTokenInvalid.into());
    }

    let access_token = issue_access_token(
        record.user_id,
        &auth_settings.token_secret,
        auth_settings.access_token_ttl_seconds,
    )?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        token: access_token,
    }))
}

/// POST /api/revoke
///
/// Stamps `revoked_at` on the presented refresh token. A token that is
/// both already revoked and already expired is reported as not found;
/// a revoked-but-unexpired token is re-stamped and still answers 204.
pub async fn revoke(req: HttpRequest, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;

    let record = get_refresh_token(pool.get_ref(), &token)
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound("refresh token".to_string())))?;

    if !record.is_revocable() {
        return Err(DatabaseError::NotFound("refresh token".to_string()).into());
    }

    revoke_refresh_token(pool.get_ref(), &record.token).await?;

    tracing::info!(user_id = %record.user_id, "refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}
