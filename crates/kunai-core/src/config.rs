use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing key for access tokens. Must be set; there is no default.
    pub secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address as a string in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails,
    /// or if the token signing secret is missing or empty.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8642)?
            .set_default("database.url", "data.db")?
            .set_default("database.max_connections", 4)?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        if settings.auth.secret.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "auth.secret must be set to a non-empty signing key".to_string(),
            )
            .into());
        }

        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
