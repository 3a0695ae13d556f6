use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod model;
pub mod postgres;

pub use model::{Event, Token, User};

/// Failure modes of the persistence layer. Absence of a record is not an
/// error; lookups signal it with `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (email, username, token string) rejected the
    /// write. The database constraint, not the service-level pre-check, is
    /// the authority on duplicates.
    #[error("duplicate key")]
    Duplicate,
    #[error("store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user and return the stored row.
    async fn create(&self, user: &User) -> Result<User, StoreError>;
    async fn update(&self, user: &User) -> Result<(), StoreError>;
    /// Returns `false` when no row matched the id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn create(&self, token: &Token) -> Result<(), StoreError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Token>, StoreError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, StoreError>;
    async fn update(&self, event: &Event) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
    async fn list(&self) -> Result<Vec<Event>, StoreError>;
}
