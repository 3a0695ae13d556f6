use serde::Deserialize;

use crate::auth::service::DEFAULT_SESSION_TTL;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_SESSION_TTL.whole_hours()),
        };
        Ok(Self {
            database_url,
            session,
        })
    }
}
