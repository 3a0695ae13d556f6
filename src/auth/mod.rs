use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod handlers;
pub mod password;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
