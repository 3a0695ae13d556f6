//! In-memory store implementations. They back the service tests and are
//! handy for local hacking without a database; the Postgres stores are the
//! production path.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{StoreError, Token, TokenStore, User, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username || u.id == user.id)
        {
            return Err(StoreError::Duplicate);
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id != user.id && (u.email == user.email || u.username == user.username))
        {
            return Err(StoreError::Duplicate);
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(StoreError::Unavailable(anyhow::anyhow!(
                "no user row matched id {}",
                user.id
            ))),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Vec<Token>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create(&self, token: &Token) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.iter().any(|t| t.token == token.token) {
            return Err(StoreError::Duplicate);
        }
        tokens.push(token.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Token>, StoreError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token == token).cloned())
    }
}
