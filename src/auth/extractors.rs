use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::warn;
use uuid::Uuid;

use super::error::RejectionReason;
use crate::state::AppState;

/// Extracts the bearer token, resolves it through the auth service, and
/// yields the acting user id. Every rejection renders the same 401 body;
/// the concrete reason only reaches the logs.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Expect "Bearer <token>"; anything else counts as no credential.
        let bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")));

        match state.auth.authorize(bearer).await {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(reason) => {
                match reason {
                    // LookupFailure is already logged at error level inside
                    // the service with the underlying cause.
                    RejectionReason::LookupFailure => {}
                    _ => warn!(%reason, "request rejected"),
                }
                Err((StatusCode::UNAUTHORIZED, "unauthorized".to_string()))
            }
        }
    }
}
