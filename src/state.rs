use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use time::Duration;

use crate::auth::service::AuthService;
use crate::config::AppConfig;
use crate::store::postgres::{PgEventStore, PgTokenStore, PgUserStore};
use crate::store::{EventStore, TokenStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.clone()));
        let tokens: Arc<dyn TokenStore> = Arc::new(PgTokenStore::new(db.clone()));
        let events: Arc<dyn EventStore> = Arc::new(PgEventStore::new(db.clone()));
        let auth = AuthService::new(
            users.clone(),
            tokens,
            Duration::hours(config.session.ttl_hours),
        );
        Self {
            db,
            config,
            auth,
            users,
            events,
        }
    }
}
