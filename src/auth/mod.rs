pub mod dto;
pub(crate) mod extractor;
pub mod handlers;
pub mod password;
mod service;
pub mod token;
mod validate;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
