use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod submission;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
