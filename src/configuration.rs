use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    /// Deployment tag. The destructive admin reset endpoint is only
    /// enabled when this is "dev".
    pub platform: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Session and credential settings.
///
/// The access-token issuer tag is deliberately NOT configurable; it lives as
/// a constant next to the codec so every deployment shares one namespace.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC secret for access-token signing and validation.
    pub token_secret: String,
    /// Access token lifetime in seconds (3600 = the 1-hour window).
    pub access_token_ttl_seconds: i64,
    /// Refresh token lifetime in seconds (5184000 = 60 days).
    pub refresh_token_ttl_seconds: i64,
    /// Static API key presented by the billing webhook caller.
    pub polka_key: String,
}

/// Reads `configuration.yaml` if present, then overlays `APP__`-prefixed
/// environment variables (e.g. `APP__AUTH__TOKEN_SECRET`), so secrets can
/// stay out of the file.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
