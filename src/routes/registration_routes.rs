use axum::{Router, routing::post};

use crate::handlers::register_handler::register_handler;
use crate::state::AppState;

pub fn registration_routes() -> Router<AppState> {
    Router::new().route("/api/register", post(register_handler))
}
