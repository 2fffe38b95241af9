mod dto;
pub mod handlers;
pub mod recipes;
pub mod repo;
pub mod repo_types;
mod services;

pub use recipes::{build_tree, top_level_totals, EntryNode};
pub use repo_types::{Entry, NewEntry};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
        .merge(handlers::recipe_routes())
}
