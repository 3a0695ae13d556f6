use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Event, EventStore, StoreError, Token, TokenStore, User, UserStore};

fn map_sqlx(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return StoreError::Duplicate;
        }
    }
    StoreError::Unavailable(e.into())
}

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     is_active, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> Result<User, StoreError> {
        let stored = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name,
                               is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $1, email = $2, password_hash = $3, first_name = $4,
                last_name = $5, is_active = $6, updated_at = $7, deleted_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(user.deleted_at)
        .bind(user.id)
        .execute(&self.db)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Unavailable(anyhow::anyhow!(
                "no user row matched id {}",
                user.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(users)
    }
}

#[derive(Clone)]
pub struct PgTokenStore {
    db: PgPool,
}

impl PgTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn create(&self, token: &Token) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (id, user_id, token, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Token>, StoreError> {
        let row = sqlx::query_as::<_, Token>(
            r#"
            SELECT id, user_id, token, expires_at, created_at, updated_at
            FROM tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(row)
    }
}

const EVENT_COLUMNS: &str = "id, title, description, location, start_time, end_time, capacity, \
     is_public, status, organizer_id, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct PgEventStore {
    db: PgPool,
}

impl PgEventStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create(&self, event: &Event) -> Result<Event, StoreError> {
        let stored = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (id, title, description, location, start_time, end_time,
                                capacity, is_public, status, organizer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.capacity)
        .bind(event.is_public)
        .bind(&event.status)
        .bind(event.organizer_id)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(stored)
    }

    async fn update(&self, event: &Event) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = $1, description = $2, location = $3, start_time = $4, end_time = $5,
                capacity = $6, is_public = $7, status = $8, updated_at = $9, deleted_at = $10
            WHERE id = $11
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.capacity)
        .bind(event.is_public)
        .bind(&event.status)
        .bind(event.updated_at)
        .bind(event.deleted_at)
        .bind(event.id)
        .execute(&self.db)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Unavailable(anyhow::anyhow!(
                "no event row matched id {}",
                event.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(event)
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE deleted_at IS NULL ORDER BY start_time"
        ))
        .fetch_all(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(events)
    }
}
