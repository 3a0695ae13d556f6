use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Event;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_is_public() -> bool {
    true
}

fn default_status() -> String {
    "scheduled".to_string()
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub capacity: Option<i32>,
    pub is_public: Option<bool>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub capacity: i32,
    pub is_public: bool,
    pub status: String,
    pub organizer_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            start_time: event.start_time,
            end_time: event.end_time,
            capacity: event.capacity,
            is_public: event.is_public,
            status: event.status,
            organizer_id: event.organizer_id,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults() {
        let json = r#"{
            "title": "RustConf",
            "start_time": "2026-09-01T09:00:00Z",
            "end_time": "2026-09-01T18:00:00Z"
        }"#;
        let req: CreateEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.title, "RustConf");
        assert_eq!(req.capacity, 0);
        assert!(req.is_public);
        assert_eq!(req.status, "scheduled");
    }

    #[test]
    fn event_response_uses_rfc3339_timestamps() {
        let now = time::macros::datetime!(2026-09-01 09:00:00 UTC);
        let response = EventResponse {
            id: Uuid::new_v4(),
            title: "RustConf".to_string(),
            description: String::new(),
            location: String::new(),
            start_time: now,
            end_time: now,
            capacity: 100,
            is_public: true,
            status: "scheduled".to_string(),
            organizer_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("2026-09-01T09:00:00Z"));
    }
}
