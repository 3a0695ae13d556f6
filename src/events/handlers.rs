use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::dto::{CreateEventRequest, EventResponse, UpdateEventRequest};
use crate::{auth::extractors::AuthUser, state::AppState, store::Event};

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), (StatusCode, String)> {
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title required".to_string()));
    }
    if payload.end_time < payload.start_time {
        return Err((
            StatusCode::BAD_REQUEST,
            "End time before start time".to_string(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let event = Event {
        id: Uuid::new_v4(),
        title: payload.title,
        description: payload.description,
        location: payload.location,
        start_time: payload.start_time,
        end_time: payload.end_time,
        capacity: payload.capacity,
        is_public: payload.is_public,
        status: payload.status,
        organizer_id: user_id,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    let stored = state.events.create(&event).await.map_err(|e| {
        error!(error = %e, "create event failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(event_id = %stored.id, organizer_id = %user_id, "event created");
    Ok((StatusCode::CREATED, Json(stored.into())))
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<EventResponse>>, (StatusCode, String)> {
    let events = state
        .events
        .list()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, (StatusCode, String)> {
    let event = state
        .events
        .find_by_id(id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .filter(|e| e.deleted_at.is_none())
        .ok_or((StatusCode::NOT_FOUND, "Event not found".to_string()))?;
    Ok(Json(event.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, (StatusCode, String)> {
    let mut event = state
        .events
        .find_by_id(id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .filter(|e| e.deleted_at.is_none())
        .ok_or((StatusCode::NOT_FOUND, "Event not found".to_string()))?;

    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Title required".to_string()));
        }
        event.title = title;
    }
    if let Some(description) = payload.description {
        event.description = description;
    }
    if let Some(location) = payload.location {
        event.location = location;
    }
    if let Some(start_time) = payload.start_time {
        event.start_time = start_time;
    }
    if let Some(end_time) = payload.end_time {
        event.end_time = end_time;
    }
    if event.end_time < event.start_time {
        return Err((
            StatusCode::BAD_REQUEST,
            "End time before start time".to_string(),
        ));
    }
    if let Some(capacity) = payload.capacity {
        event.capacity = capacity;
    }
    if let Some(is_public) = payload.is_public {
        event.is_public = is_public;
    }
    if let Some(status) = payload.status {
        event.status = status;
    }
    event.updated_at = OffsetDateTime::now_utc();

    state.events.update(&event).await.map_err(|e| {
        error!(error = %e, event_id = %id, "update event failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(event_id = %id, "event updated");
    Ok(Json(event.into()))
}

#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.events.delete(id).await.map_err(|e| {
        error!(error = %e, event_id = %id, "delete event failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Event not found".to_string()));
    }
    info!(event_id = %id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}
