/// Admin Panel
///
/// Metrics page plus the destructive reset endpoint, which is only wired
/// for dev deployments.

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::middleware::AppMetrics;

/// GET /admin/metrics
pub async fn metrics_page(metrics: web::Data<AppMetrics>) -> HttpResponse {
    let body = format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirps Admin</h1>\n    <p>Chirps has been visited {} times!</p>\n  </body>\n</html>",
        metrics.hits()
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

/// POST /admin/reset
///
/// Zeroes the hit counter and deletes every user; chirps and refresh
/// tokens go with them through the schema's cascades. Refused outside the
/// "dev" platform.
pub async fn reset(
    metrics: web::Data<AppMetrics>,
    pool: web::Data<PgPool>,
    app_settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if app_settings.platform != "dev" {
        return Ok(HttpResponse::Forbidden().finish());
    }

    metrics.reset();
    sqlx::query("DELETE FROM users").execute(pool.get_ref()).await?;

    tracing::info!("metrics and user data reset");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(format!("Hits: {}\n", metrics.hits())))
}
