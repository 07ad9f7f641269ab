/// User Accounts
///
/// Account creation and credential updates. The stored record only ever
/// sees the password hash; responses never include it.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{bearer_token, hash_password, validate_access_token};
use crate::configuration::AuthSettings;
use crate::error::{AppError, DatabaseError};
use crate::validators::validate_email;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub is_chirpy_red: bool,
}

/// POST /api/users
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let email = validate_email(&form.email)?;
    let hashed_password = hash_password(&form.password)?;

    let user_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO users (id, created_at, updated_at, email, hashed_password)
        VALUES ($1, $2, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(now)
    .bind(&email)
    .bind(&hashed_password)
    .execute(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user_id, "user created");

    Ok(HttpResponse::Created().json(UserResponse {
        id: user_id.to_string(),
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
        email,
        is_chirpy_red: false,
    }))
}

/// PUT /api/users
///
/// Replaces the authenticated user's email and password. The actor is the
/// access token's subject; no other user is reachable from this endpoint.
pub async fn update_user(
    req: HttpRequest,
    form: web::Json<UpdateUserRequest>,
    pool: web::Data<PgPool>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;
    let actor = validate_access_token(&token, &auth_settings.token_secret)?;

    let email = validate_email(&form.email)?;
    let hashed_password = hash_password(&form.password)?;

    let row = sqlx::query_as::<_, (DateTime<Utc>, DateTime<Utc>, bool)>(
        r#"
        UPDATE users
        SET email = $1, hashed_password = $2, updated_at = $3
        WHERE id = $4
        RETURNING created_at, updated_at, is_chirpy_red
        "#,
    )
    .bind(&email)
    .bind(&hashed_password)
    .bind(Utc::now())
    .bind(actor)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("user".to_string())))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: actor.to_string(),
        created_at: row.0.to_rfc3339(),
        updated_at: row.1.to_rfc3339(),
        email,
        is_chirpy_red: row.2,
    }))
}
