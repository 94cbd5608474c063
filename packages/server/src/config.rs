use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub session_secret: String,
    pub jwt_auth_secret: String,
    pub jwt_ttl_hours: i64,
    pub session_dir: PathBuf,
    pub session_ttl_hours: i64,
    pub session_sweep_secs: u64,
    pub database_url: Option<String>,
    pub static_dir: PathBuf,
}

/// Deployment environment, read from `NODE_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            environment: Environment::parse(
                &env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),
            ),
            session_secret: env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            jwt_auth_secret: env::var("JWT_AUTH_SECRET").context("JWT_AUTH_SECRET must be set")?,
            jwt_ttl_hours: env::var("JWT_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("JWT_TTL_HOURS must be a valid number")?,
            session_dir: env::var("SESSION_DIR")
                .unwrap_or_else(|_| "./sessions".to_string())
                .into(),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("SESSION_TTL_HOURS must be a valid number")?,
            session_sweep_secs: env::var("SESSION_SWEEP_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("SESSION_SWEEP_SECS must be a valid number")?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "./static".to_string())
                .into(),
        })
    }

    /// Configuration for tests and local tooling; secrets are fixed strings.
    pub fn for_tests(session_dir: PathBuf) -> Self {
        Self {
            port: 0,
            environment: Environment::Development,
            session_secret: "test_session_secret".to_string(),
            jwt_auth_secret: "test_jwt_secret".to_string(),
            jwt_ttl_hours: 24,
            session_dir,
            session_ttl_hours: 24,
            session_sweep_secs: 3600,
            database_url: None,
            static_dir: "./static".into(),
        }
    }
}
