/// Chirps
///
/// Creating, listing, and deleting short posts. Creation and deletion are
/// privileged: the access token's subject is the actor, and ownership is
/// enforced here in the handler rather than in the auth core.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{bearer_token, validate_access_token};
use crate::configuration::AuthSettings;
use crate::error::{AppError, DatabaseError, ValidationError};

/// Posting policy: length cap and the words scrubbed from bodies.
/// Injected as shared state so nothing here is a process global.
pub struct ChirpPolicy {
    pub max_length: usize,
    pub profane_words: Vec<String>,
}

impl Default for ChirpPolicy {
    fn default() -> Self {
        Self {
            max_length: 140,
            profane_words: ["kerfuffle", "sharbert", "fornax"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ChirpPolicy {
    /// Replace profane words with `****`. Matching is per space-separated
    /// word, case-insensitive, exact: punctuation glued to a word defeats
    /// the filter, as it always has.
    pub fn clean(&self, body: &str) -> String {
        body.split(' ')
            .map(|word| {
                if self
                    .profane_words
                    .iter()
                    .any(|profane| profane.eq_ignore_ascii_case(word))
                {
                    "****"
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    pub user_id: String,
}

type ChirpRow = (Uuid, DateTime<Utc>, DateTime<Utc>, String, Uuid);

fn to_response(row: ChirpRow) -> ChirpResponse {
    ChirpResponse {
        id: row.0.to_string(),
        created_at: row.1.to_rfc3339(),
        updated_at: row.2.to_rfc3339(),
        body: row.3,
        user_id: row.4.to_string(),
    }
}

/// POST /api/chirps
pub async fn create_chirp(
    req: HttpRequest,
    form: web::Json<CreateChirpRequest>,
    pool: web::Data<PgPool>,
    auth_settings: web::Data<AuthSettings>,
    policy: web::Data<ChirpPolicy>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;
    let actor = validate_access_token(&token, &auth_settings.token_secret)?;

    if form.body.chars().count() > policy.max_length {
        return Err(ValidationError::ChirpTooLong(policy.max_length).into());
    }

    let chirp_id = Uuid::new_v4();
    let now = Utc::now();
    let body = policy.clean(&form.body);

    sqlx::query(
        r#"
        INSERT INTO chirps (id, created_at, updated_at, body, user_id)
        VALUES ($1, $2, $2, $3, $4)
        "#,
    )
    .bind(chirp_id)
    .bind(now)
    .bind(&body)
    .bind(actor)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(ChirpResponse {
        id: chirp_id.to_string(),
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
        body,
        user_id: actor.to_string(),
    }))
}

/// GET /api/chirps
///
/// Ordered by creation time ascending; `sort=desc` reverses. `author_id`
/// filters to one user's chirps.
pub async fn get_all_chirps(
    query: web::Query<ListChirpsQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let mut rows = match &query.author_id {
        None => {
            sqlx::query_as::<_, ChirpRow>(
                r#"
                SELECT id, created_at, updated_at, body, user_id
                FROM chirps
                ORDER BY created_at ASC
                "#,
            )
            .fetch_all(pool.get_ref())
            .await?
        }
        Some(author_id) => {
            let author = Uuid::parse_str(author_id).map_err(|_| {
                AppError::Validation(ValidationError::InvalidIdentifier("author_id".to_string()))
            })?;
            sqlx::query_as::<_, ChirpRow>(
                r#"
                SELECT id, created_at, updated_at, body, user_id
                FROM chirps
                WHERE user_id = $1
                ORDER BY created_at ASC
                "#,
            )
            .bind(author)
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    if query.sort.as_deref() == Some("desc") {
        rows.reverse();
    }

    let chirps: Vec<ChirpResponse> = rows.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp_by_id(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = Uuid::parse_str(&path).map_err(|_| {
        AppError::Validation(ValidationError::InvalidIdentifier("chirp_id".to_string()))
    })?;

    let row = sqlx::query_as::<_, ChirpRow>(
        r#"
        SELECT id, created_at, updated_at, body, user_id
        FROM chirps
        WHERE id = $1
        "#,
    )
    .bind(chirp_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("chirp".to_string())))?;

    Ok(HttpResponse::Ok().json(to_response(row)))
}

/// DELETE /api/chirps/{chirp_id}
///
/// Only the chirp's owner may delete it; anyone else gets 403.
pub async fn delete_chirp(
    req: HttpRequest,
    path: web::Path<String>,
    pool: web::Data<PgPool>,
    auth_settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = Uuid::parse_str(&path).map_err(|_| {
        AppError::Validation(ValidationError::InvalidIdentifier("chirp_id".to_string()))
    })?;

    let token = bearer_token(req.headers())?;
    let actor = validate_access_token(&token, &auth_settings.token_secret)?;

    let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM chirps WHERE id = $1")
        .bind(chirp_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound("chirp".to_string())))?;

    if owner != actor {
        return Ok(HttpResponse::Forbidden().finish());
    }

    sqlx::query("DELETE FROM chirps WHERE id = $1")
        .bind(chirp_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
