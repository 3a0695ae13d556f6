use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{dto::PublicUser, extractors::AuthUser, handlers::is_valid_email},
    state::AppState,
    store::StoreError,
};

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "find_by_id failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or_else(|| {
            warn!(%user_id, "token resolved to missing user");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<PublicUser>>, (StatusCode, String)> {
    let users = state
        .users
        .list()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let mut user = state
        .users
        .find_by_id(id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err((StatusCode::BAD_REQUEST, "Invalid email".to_string()));
        }
        user.email = email;
    }
    if let Some(username) = payload.username {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Username required".to_string()));
        }
        user.username = username;
    }
    if let Some(first_name) = payload.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        user.last_name = last_name;
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }
    user.updated_at = OffsetDateTime::now_utc();

    match state.users.update(&user).await {
        Ok(()) => {
            info!(user_id = %user.id, "user updated");
            Ok(Json(user.into()))
        }
        Err(StoreError::Duplicate) => Err((
            StatusCode::CONFLICT,
            "Email or username already taken".to_string(),
        )),
        Err(e) => {
            error!(error = %e, user_id = %id, "update user failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    // Tokens go with the user via the FK cascade.
    let deleted = state
        .users
        .delete(id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %id, "delete user failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "User not found".to_string()));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
