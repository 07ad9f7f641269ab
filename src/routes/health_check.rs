use actix_web::http::header::ContentType;
use actix_web::HttpResponse;

/// GET /api/healthz
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("OK")
}
