use std::sync::Arc;

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use time::{Duration, OffsetDateTime};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::{AuthError, RejectionReason};
use super::password::{hash_password, verify_password};
use crate::store::{StoreError, Token, TokenStore, User, UserStore};

pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

/// Length of the bearer token string. 48 alphanumeric chars is ~285 bits of
/// entropy from the OS CSPRNG.
const TOKEN_LENGTH: usize = 48;

/// Registration input, plaintext password included. The password leaves this
/// struct only as an Argon2 digest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Orchestrates registration, login and request authorization. The only
/// component that mints tokens; everything it touches goes through the
/// injected store traits.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            session_ttl,
        }
    }

    /// Register a new user. The email pre-check runs before any hashing
    /// work, but it is best-effort only: a concurrent registration slipping
    /// between the check and the insert is caught by the store's unique
    /// constraint and reported as the same duplicate error.
    pub async fn register(&self, new: NewUser) -> Result<User, AuthError> {
        if self.users.find_by_email(&new.email).await?.is_some() {
            warn!(email = %new.email, "registration for existing email");
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = hash_password(&new.password)?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let stored = match self.users.create(&user).await {
            Ok(stored) => stored,
            Err(StoreError::Duplicate) => return Err(AuthError::DuplicateUser),
            Err(e) => return Err(AuthError::Persistence(e)),
        };

        info!(user_id = %stored.id, username = %stored.username, "user registered");
        Ok(stored)
    }

    /// Authenticate by email and password, minting a session token on
    /// success. Unknown email, wrong password, and deactivated account all
    /// come back as the same `InvalidCredentials`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, Token), AuthError> {
        let user = match self.users.find_by_email(email).await? {
            Some(u) if u.is_active && u.deleted_at.is_none() => u,
            _ => {
                warn!(email = %email, "login for unknown or inactive account");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "login with invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = OffsetDateTime::now_utc();
        let token = Token {
            id: Uuid::new_v4(),
            user_id: user.id,
            token: generate_token_string(),
            expires_at: now + self.session_ttl,
            created_at: now,
            updated_at: now,
        };
        self.tokens
            .create(&token)
            .await
            .map_err(AuthError::Persistence)?;

        info!(user_id = %user.id, token_id = %token.id, "session token issued");
        Ok((user, token))
    }

    /// Resolve a bearer token to the acting user id. Each rejection reason
    /// is distinct here; the HTTP layer collapses them into one uniform 401.
    pub async fn authorize(&self, bearer: Option<&str>) -> Result<Uuid, RejectionReason> {
        let raw = match bearer {
            Some(t) if !t.is_empty() => t,
            _ => return Err(RejectionReason::MissingCredential),
        };

        let token = match self.tokens.find_by_token(raw).await {
            Ok(Some(t)) => t,
            Ok(None) => return Err(RejectionReason::InvalidToken),
            Err(e) => {
                error!(error = %e, "token lookup failed");
                return Err(RejectionReason::LookupFailure);
            }
        };

        // Expired rows are rejected, not purged; cleanup is a maintenance
        // concern, not a hot-path one.
        if token.expires_at <= OffsetDateTime::now_utc() {
            return Err(RejectionReason::ExpiredToken);
        }

        Ok(token.user_id)
    }
}

/// Bearer token strings come from the OS CSPRNG, not from the Uuid
/// generator used for entity ids: ids only need uniqueness, credentials
/// need unpredictability.
fn generate_token_string() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::store::memory::{MemoryTokenStore, MemoryUserStore};

    fn alice() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "Secret123".to_string(),
            first_name: "Alice".to_string(),
            last_name: "A".to_string(),
        }
    }

    fn service() -> (AuthService, Arc<MemoryUserStore>, Arc<MemoryTokenStore>) {
        let users = Arc::new(MemoryUserStore::default());
        let tokens = Arc::new(MemoryTokenStore::default());
        let svc = AuthService::new(users.clone(), tokens.clone(), DEFAULT_SESSION_TTL);
        (svc, users, tokens)
    }

    struct FailingTokenStore;

    #[async_trait]
    impl TokenStore for FailingTokenStore {
        async fn create(&self, _token: &Token) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(anyhow::anyhow!("store is down")))
        }
        async fn find_by_token(&self, _token: &str) -> Result<Option<Token>, StoreError> {
            Err(StoreError::Unavailable(anyhow::anyhow!("store is down")))
        }
    }

    struct CountingTokenStore {
        inner: MemoryTokenStore,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl TokenStore for CountingTokenStore {
        async fn create(&self, token: &Token) -> Result<(), StoreError> {
            self.inner.create(token).await
        }
        async fn find_by_token(&self, token: &str) -> Result<Option<Token>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_token(token).await
        }
    }

    #[tokio::test]
    async fn register_returns_user_with_hashed_password() {
        let (svc, _, _) = service();
        let user = svc.register(alice()).await.expect("register should succeed");
        assert!(!user.id.is_nil());
        assert!(user.is_active);
        assert_ne!(user.password_hash, "Secret123");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_registration_leaves_first_user_intact() {
        let (svc, _, _) = service();
        let first = svc.register(alice()).await.expect("first register");
        let err = svc.register(alice()).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));

        // the first account still works
        let (user, _) = svc
            .authenticate("a@x.com", "Secret123")
            .await
            .expect("first user still authenticates");
        assert_eq!(user.id, first.id);
    }

    #[tokio::test]
    async fn lost_create_race_reports_duplicate() {
        // A store that never sees the pre-check hit but rejects the insert,
        // as happens when a concurrent writer wins between check and create.
        struct RacyUserStore {
            inner: MemoryUserStore,
        }

        #[async_trait]
        impl UserStore for RacyUserStore {
            async fn create(&self, _user: &User) -> Result<User, StoreError> {
                Err(StoreError::Duplicate)
            }
            async fn update(&self, user: &User) -> Result<(), StoreError> {
                self.inner.update(user).await
            }
            async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
                self.inner.delete(id).await
            }
            async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
                self.inner.find_by_id(id).await
            }
            async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
                Ok(None)
            }
            async fn list(&self) -> Result<Vec<User>, StoreError> {
                self.inner.list().await
            }
        }

        let svc = AuthService::new(
            Arc::new(RacyUserStore {
                inner: MemoryUserStore::default(),
            }),
            Arc::new(MemoryTokenStore::default()),
            DEFAULT_SESSION_TTL,
        );
        let err = svc.register(alice()).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let (svc, _, _) = service();
        svc.register(alice()).await.expect("register");

        let unknown = svc
            .authenticate("nobody@x.com", "Secret123")
            .await
            .unwrap_err();
        let wrong = svc.authenticate("a@x.com", "wrong").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn authenticate_issues_persisted_token_with_session_ttl() {
        let (svc, _, tokens) = service();
        svc.register(alice()).await.expect("register");

        let before = OffsetDateTime::now_utc();
        let (user, token) = svc
            .authenticate("a@x.com", "Secret123")
            .await
            .expect("authenticate");
        let after = OffsetDateTime::now_utc();

        assert_eq!(token.user_id, user.id);
        assert_eq!(token.token.len(), TOKEN_LENGTH);
        assert!(token.token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(token.expires_at >= before + DEFAULT_SESSION_TTL);
        assert!(token.expires_at <= after + DEFAULT_SESSION_TTL);

        let stored = tokens
            .find_by_token(&token.token)
            .await
            .expect("lookup")
            .expect("token was persisted");
        assert_eq!(stored.id, token.id);
    }

    #[tokio::test]
    async fn consecutive_logins_issue_distinct_tokens() {
        let (svc, _, _) = service();
        svc.register(alice()).await.expect("register");
        let (_, first) = svc.authenticate("a@x.com", "Secret123").await.expect("login");
        let (_, second) = svc.authenticate("a@x.com", "Secret123").await.expect("login");
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn token_store_failure_is_not_a_credential_error() {
        let users = Arc::new(MemoryUserStore::default());
        let svc = AuthService::new(users.clone(), Arc::new(FailingTokenStore), DEFAULT_SESSION_TTL);
        // register against a working token-less path
        let seeded = AuthService::new(
            users.clone(),
            Arc::new(MemoryTokenStore::default()),
            DEFAULT_SESSION_TTL,
        );
        seeded.register(alice()).await.expect("register");

        let err = svc.authenticate("a@x.com", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::Persistence(_)));
    }

    #[tokio::test]
    async fn deactivated_user_cannot_authenticate() {
        let (svc, users, _) = service();
        let mut user = svc.register(alice()).await.expect("register");
        user.is_active = false;
        users.update(&user).await.expect("deactivate");

        let err = svc.authenticate("a@x.com", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn authorize_resolves_issued_token_to_owner() {
        let (svc, _, _) = service();
        let user = svc.register(alice()).await.expect("register");
        let (_, token) = svc.authenticate("a@x.com", "Secret123").await.expect("login");

        let identity = svc.authorize(Some(&token.token)).await.expect("authorized");
        assert_eq!(identity, user.id);
    }

    #[tokio::test]
    async fn authorize_without_credential_never_contacts_the_store() {
        let tokens = Arc::new(CountingTokenStore {
            inner: MemoryTokenStore::default(),
            lookups: AtomicUsize::new(0),
        });
        let svc = AuthService::new(
            Arc::new(MemoryUserStore::default()),
            tokens.clone(),
            DEFAULT_SESSION_TTL,
        );

        assert_eq!(
            svc.authorize(None).await.unwrap_err(),
            RejectionReason::MissingCredential
        );
        assert_eq!(
            svc.authorize(Some("")).await.unwrap_err(),
            RejectionReason::MissingCredential
        );
        assert_eq!(tokens.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn authorize_rejects_unknown_token() {
        let (svc, _, _) = service();
        assert_eq!(
            svc.authorize(Some("no-such-token")).await.unwrap_err(),
            RejectionReason::InvalidToken
        );
    }

    #[tokio::test]
    async fn authorize_rejects_expired_token() {
        let (svc, _, tokens) = service();
        let user = svc.register(alice()).await.expect("register");

        let now = OffsetDateTime::now_utc();
        let stale = Token {
            id: Uuid::new_v4(),
            user_id: user.id,
            token: "stale-token".to_string(),
            expires_at: now - Duration::seconds(1),
            created_at: now - DEFAULT_SESSION_TTL,
            updated_at: now - DEFAULT_SESSION_TTL,
        };
        tokens.create(&stale).await.expect("seed stale token");

        assert_eq!(
            svc.authorize(Some("stale-token")).await.unwrap_err(),
            RejectionReason::ExpiredToken
        );
    }

    #[tokio::test]
    async fn authorize_maps_store_failure_to_lookup_failure() {
        let svc = AuthService::new(
            Arc::new(MemoryUserStore::default()),
            Arc::new(FailingTokenStore),
            DEFAULT_SESSION_TTL,
        );
        assert_eq!(
            svc.authorize(Some("whatever")).await.unwrap_err(),
            RejectionReason::LookupFailure
        );
    }

    #[tokio::test]
    async fn register_login_authorize_scenario() {
        let (svc, _, _) = service();

        let user = svc.register(alice()).await.expect("register alice");
        assert!(!user.id.is_nil());
        assert_ne!(user.password_hash, "Secret123");

        let (logged_in, token) = svc
            .authenticate("a@x.com", "Secret123")
            .await
            .expect("authenticate alice");
        assert_eq!(logged_in.id, user.id);

        let identity = svc.authorize(Some(&token.token)).await.expect("authorized");
        assert_eq!(identity, user.id);

        let err = svc.authenticate("a@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
