use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::Settings;
use crate::middleware::{AppMetrics, MetricsMiddleware};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_all_chirps, get_chirp_by_id, health_check,
    login, metrics_page, polka_webhook, refresh, reset, revoke, update_user, ChirpPolicy,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let auth_settings = web::Data::new(settings.auth);
    let app_settings = web::Data::new(settings.application);
    let metrics = web::Data::new(AppMetrics::default());
    let chirp_policy = web::Data::new(ChirpPolicy::default());

    let server = HttpServer::new(move || {
        App::new()
            // Shared state
            .app_data(connection.clone())
            .app_data(auth_settings.clone())
            .app_data(app_settings.clone())
            .app_data(metrics.clone())
            .app_data(chirp_policy.clone())

            // Public API
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/chirps", web::get().to(get_all_chirps))
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp_by_id))

            // Access-token protected API (enforced in the handlers)
            .route("/api/users", web::put().to(update_user))
            .route("/api/chirps", web::post().to(create_chirp))
            .route("/api/chirps/{chirp_id}", web::delete().to(delete_chirp))

            // Trusted webhook caller (ApiKey)
            .route("/api/polka/webhooks", web::post().to(polka_webhook))

            // Admin panel
            .route("/admin/metrics", web::get().to(metrics_page))
            .route("/admin/reset", web::post().to(reset))

            // Static site, with hit counting
            .service(
                web::scope("/app")
                    .wrap(MetricsMiddleware::new(metrics.clone()))
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
