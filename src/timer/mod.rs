use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::timer_routes()
}
