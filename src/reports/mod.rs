use crate::state::AppState;
use axum::Router;

pub mod filter;
pub mod handlers;
pub mod summary;

pub fn router() -> Router<AppState> {
    handlers::report_routes()
}
