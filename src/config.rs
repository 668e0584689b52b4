use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::auth::PasswordPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url:       String,
    pub db_max_connections: u32,

    // Backend
    pub backend_host:       String,
    pub backend_port:       u16,
    pub cors_origin:        String,
    pub request_timeout:    Duration,

    // Auth
    pub jwt_secret:         String,
    pub password_policy:    PasswordPolicy,

    // Bootstrap admin account
    pub admin_email:        String,
    pub admin_password:     String,
    pub admin_name:         String,

    // Uploads
    pub upload_dir:         String,

    // App
    pub app_env:            String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        fn require(key: &str) -> Result<String, ConfigError> {
            env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        }

        fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
            match env::var(key) {
                Ok(raw) => raw
                    .parse::<T>()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw)),
                Err(_) => Ok(default),
            }
        }

        let policy_raw = require("PASSWORD_POLICY")?;
        let password_policy = policy_raw
            .parse::<PasswordPolicy>()
            .map_err(|_| ConfigError::InvalidValue("PASSWORD_POLICY".into(), policy_raw))?;

        Ok(Self {
            database_url:       env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://gosmooth.db?mode=rwc".into()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,

            backend_host:       env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            backend_port:       parse_or("BACKEND_PORT", 8080)?,
            cors_origin:        env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            request_timeout:    Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 10)?),

            jwt_secret:         require("JWT_SECRET")?,
            password_policy,

            admin_email:        env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "Admin001@go-smooth.co.th".into()),
            admin_password:     env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "goadmin7".into()),
            admin_name:         env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".into()),

            upload_dir:         env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),

            app_env:            env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
