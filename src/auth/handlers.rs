use axum::{extract::State, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    error::AuthError,
    service::NewUser,
};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::Validation("invalid email".into()));
    }
    if payload.username.is_empty() {
        return Err(AuthError::Validation("username required".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AuthError::Validation("password too short".into()));
    }

    let user = state
        .auth
        .register(NewUser {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::Validation("invalid email".into()));
    }

    let (user, token) = state.auth.authenticate(&payload.email, &payload.password).await?;

    Ok(Json(AuthResponse {
        expires_at: token.expires_at,
        token: token.token,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@nodot"));
    }
}
