//! API module for the StoryHunt serve crate

use crate::handlers::{handle_health, AppState};
use crate::search::search_routes;
use axum::{routing::get, Router};

/// API routes configuration
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health))
        .merge(search_routes())
}
