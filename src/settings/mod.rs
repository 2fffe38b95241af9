mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

pub use repo_types::UserSettings;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
