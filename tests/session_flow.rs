//! Session lifecycle integration tests.
//!
//! Each test boots the full server against a throwaway database, so the
//! suite needs a running Postgres matching `configuration.yaml`. The tests
//! are `#[ignore]`d for that reason; run them with `cargo test -- --ignored`.

use chirps::configuration::{get_configuration, DatabaseSettings};
use chirps::startup::run;
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(listener, connection_pool.clone(), configuration).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

async fn register_and_login(app: &TestApp, client: &reqwest::Client) -> Value {
    let user = json!({
        "email": "walt@breakingbad.com",
        "password": "123456"
    });

    let response = client
        .post(format!("{}/api/users", &app.address))
        .json(&user)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let response = client
        .post(format!("{}/api/login", &app.address))
        .json(&user)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    response.json().await.expect("Failed to parse login response")
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn login_returns_both_tokens_for_valid_credentials() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, &client).await;

    let access_token = login["token"].as_str().expect("no access token");
    let refresh_token = login["refresh_token"].as_str().expect("no refresh token");

    assert!(!access_token.is_empty());
    assert_eq!(refresh_token.len(), 64);
    assert_eq!(login["is_chirpy_red"], false);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn login_rejects_wrong_password() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let _ = register_and_login(&app, &client).await;

    let response = client
        .post(format!("{}/api/login", &app.address))
        .json(&json!({"email": "walt@breakingbad.com", "password": "654321"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn full_session_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, &client).await;
    let access_token = login["token"].as_str().unwrap();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    // Privileged call with the access token succeeds.
    let response = client
        .post(format!("{}/api/chirps", &app.address))
        .header("Authorization", format!("Bearer {}", access_token))
        .json(&json!({"body": "I'm the one who knocks"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    // Refresh mints a new access token; the refresh token is not rotated.
    let response = client
        .post(format!("{}/api/refresh", &app.address))
        .header("Authorization", format!("Bearer {}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());

    // Revoke, then the refresh token stops working.
    let response = client
        .post(format!("{}/api/revoke", &app.address))
        .header("Authorization", format!("Bearer {}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let response = client
        .post(format!("{}/api/refresh", &app.address))
        .header("Authorization", format!("Bearer {}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoking_an_already_revoked_unexpired_token_succeeds() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, &client).await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/revoke", &app.address))
            .header("Authorization", format!("Bearer {}", refresh_token))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(204, response.status().as_u16());
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoking_an_unknown_token_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/revoke", &app.address))
        .header("Authorization", format!("Bearer {}", "0".repeat(64)))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn privileged_call_without_credential_is_unauthorized() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/chirps", &app.address))
        .json(&json!({"body": "anonymous chirp"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn webhook_requires_the_configured_api_key() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let login = register_and_login(&app, &client).await;
    let user_id = login["id"].as_str().unwrap().to_string();

    let event = json!({"event": "user.upgraded", "data": {"user_id": user_id}});

    // Wrong key is rejected.
    let response = client
        .post(format!("{}/api/polka/webhooks", &app.address))
        .header("Authorization", "ApiKey not-the-key")
        .json(&event)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    // The configured key upgrades the account.
    let configuration = get_configuration().expect("Failed to read configuration.");
    let response = client
        .post(format!("{}/api/polka/webhooks", &app.address))
        .header("Authorization", format!("ApiKey {}", configuration.auth.polka_key))
        .json(&event)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let is_red =
        sqlx::query_scalar::<_, bool>("SELECT is_chirpy_red FROM users WHERE email = $1")
            .bind("walt@breakingbad.com")
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch user");
    assert!(is_red);
}
