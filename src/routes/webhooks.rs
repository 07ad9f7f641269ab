/// Billing Webhooks
///
/// A single trusted caller (the payment provider) authorizes with a static
/// API key and notifies us of account upgrades. Unknown event kinds are
/// acknowledged and dropped so the provider does not retry them.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::api_key;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};

const UPGRADE_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: String,
}

/// POST /api/polka/webhooks
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Json<WebhookEvent>,
    pool: web::Data<PgPool>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let key = api_key(req.headers())?;
    if key != auth_settings.polka_key {
        return Err(AuthError::InvalidCredentials.into());
    }

    if body.event != UPGRADE_EVENT {
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = Uuid::parse_str(&body.data.user_id).map_err(|_| {
        AppError::Validation(ValidationError::InvalidIdentifier("user_id".to_string()))
    })?;

    let result = sqlx::query("UPDATE users SET is_chirpy_red = true, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("user".to_string()).into());
    }

    tracing::info!(user_id = %user_id, "user upgraded via webhook");

    Ok(HttpResponse::NoContent().finish())
}
