use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by registration and login. Credential failures and
/// storage failures stay distinct so the handler can map them to 401 vs 500.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    DuplicateUser,
    /// Covers both unknown email and wrong password. One variant, one
    /// message: callers must not be able to tell which it was.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed")]
    Hashing(#[source] anyhow::Error),
    #[error("storage failure")]
    Persistence(#[from] StoreError),
    #[error("{0}")]
    Validation(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::DuplicateUser => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Hashing(_) | AuthError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Why an authorization decision ended in `Rejected`. All of these render as
/// a uniform 401 to the caller; the distinction exists for internal logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("expired token")]
    ExpiredToken,
    #[error("token lookup failed")]
    LookupFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failure_message_does_not_distinguish_cause() {
        // The same variant serves unknown-email and wrong-password, so any
        // two occurrences must render identically.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            AuthError::InvalidCredentials.to_string()
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid email or password"
        );
    }

    #[test]
    fn persistence_wraps_store_errors() {
        let err: AuthError = StoreError::Duplicate.into();
        assert!(matches!(err, AuthError::Persistence(_)));
    }
}
