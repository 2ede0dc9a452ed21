use crate::state::AppState;
use axum::Router;

pub mod cookie;
pub(crate) mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod handlers;
pub mod password;
pub mod redirect;
pub mod repo;
pub mod repo_types;
pub mod service;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::router()
}
