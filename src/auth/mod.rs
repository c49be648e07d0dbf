use crate::state::AppState;
use axum::Router;

mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod reset;
pub mod service;
pub mod session;
pub mod store;

pub fn router() -> Router<AppState> {
    handlers::router()
}
