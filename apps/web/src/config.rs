//! Application configuration loaded from environment variables.

use std::env;

use yatube_infra::DatabaseConfig;
use yatube_infra::JwtConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Mark the cookie `Secure`; enable behind HTTPS.
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "yatube_session".to_string(),
            secure: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL")
            .ok()
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(100),
                min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(10),
            });

        let session_defaults = SessionConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            jwt: JwtConfig::from_env(),
            session: SessionConfig {
                cookie_name: env::var("SESSION_COOKIE_NAME")
                    .unwrap_or(session_defaults.cookie_name),
                secure: env::var("SESSION_COOKIE_SECURE")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(session_defaults.secure),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
