//! Configuration management for the library server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::time::Duration;

/// Ten years
const MAX_TOKEN_HOURS: u64 = 24 * 365 * 10;
const MAX_LOAN_DAYS: i64 = 365 * 10;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Connection options for the PostgreSQL pool
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.name)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    /// Registering with this referral code grants the admin flag
    pub admin_referral_code: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BorrowingConfig {
    /// Maximum number of un-returned borrowings per user
    pub max_active: i64,
    /// Loan period in days
    pub loan_days: i64,
    pub sweep_interval_secs: u64,
    /// Hard-delete the caller's returned borrowings at the end of a return
    pub purge_returned: bool,
}

impl BorrowingConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub borrowing: BorrowingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // LIBRARY_DATABASE__HOST, LIBRARY_AUTH__JWT_SECRET, ...
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Plain variables used by existing deployments
            .set_override_option("database.host", env::var("DB_HOST").ok())?
            .set_override_option("database.port", env::var("DB_PORT").ok())?
            .set_override_option("database.username", env::var("DB_USER").ok())?
            .set_override_option("database.password", env::var("DB_PASSWORD").ok())?
            .set_override_option("database.name", env::var("DB_NAME").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .set_override_option(
                "auth.admin_referral_code",
                env::var("ADMIN_REFERRAL_CODE").ok(),
            )?
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would overflow date arithmetic at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TOKEN_HOURS).contains(&self.auth.jwt_expiration_hours) {
            return Err(ConfigError::Message(format!(
                "auth.jwt_expiration_hours must be between 1 and {}",
                MAX_TOKEN_HOURS
            )));
        }
        if !(1..=MAX_LOAN_DAYS).contains(&self.borrowing.loan_days) {
            return Err(ConfigError::Message(format!(
                "borrowing.loan_days must be between 1 and {}",
                MAX_LOAN_DAYS
            )));
        }
        if self.borrowing.max_active < 1 {
            return Err(ConfigError::Message(
                "borrowing.max_active must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "library".to_string(),
            password: "library".to_string(),
            name: "library".to_string(),
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            jwt_expiration_hours: 24,
            admin_referral_code: "1234".to_string(),
        }
    }
}

impl Default for BorrowingConfig {
    fn default() -> Self {
        Self {
            max_active: 3,
            loan_days: 7,
            sweep_interval_secs: 3600,
            purge_returned: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
