use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

/// Bounds applied to plaintext passwords at sign-up and password change.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPolicy {
    pub min_len: usize,
    pub max_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password: PasswordPolicy,
}

impl AppConfig {
    /// Load configuration from the environment. The signing secret and token
    /// ttl have no usable defaults; a process missing either must not start.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is required")?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .context("JWT_TTL_MINUTES is required")?
                .parse::<i64>()
                .context("JWT_TTL_MINUTES must be an integer number of minutes")?,
        };
        let password = PasswordPolicy {
            min_len: std::env::var("PASSWORD_MIN_LEN")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(8),
            max_len: std::env::var("PASSWORD_MAX_LEN")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(16),
        };
        Ok(Self {
            database_url,
            jwt,
            password,
        })
    }
}
