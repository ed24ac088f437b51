use axum::{Router, routing::get};

use crate::handlers::health_handler::health;
use crate::state::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
