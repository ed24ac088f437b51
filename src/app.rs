use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, CorsConfig};
use crate::middlewares::{proxy::proxy_middleware, rate_limiter::rate_limiter};
use crate::state::AppState;
use crate::store::RegistrantStore;

fn cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    let origin = match cors {
        CorsConfig::Disabled => return None,
        CorsConfig::AnyOrigin => AllowOrigin::from(Any),
        CorsConfig::Origins(list) => {
            let origins = list
                .iter()
                .filter_map(|s| match HeaderValue::from_str(s) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %s, "ignoring unparsable CORS origin");
                        None
                    }
                })
                .collect::<Vec<HeaderValue>>();
            AllowOrigin::list(origins)
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    let mut app = Router::new()
        .merge(crate::routes::registration_routes::registration_routes())
        .merge(crate::routes::health_routes::health_routes())
        // Rate limiter middleware (per client IP)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limiter))
        // Must wrap the rate limiter so `ClientIp` is resolved before it runs.
        .layer(middleware::from_fn_with_state(state.clone(), proxy_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Outermost, so preflight requests are answered without touching the limiter.
    if let Some(layer) = cors_layer(cors) {
        app = app.layer(layer);
    }

    app
}

pub fn create_app(config: &AppConfig, store: Arc<dyn RegistrantStore>) -> Router {
    build_router(AppState::new(config, store), &config.cors)
}
