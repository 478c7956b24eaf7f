mod v1;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{AppConfig, CorsConfig};
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> Router<AppState> {
    Router::new().nest("/v1", v1::routes(config))
}

/// CORS layer for one route, advertising only the methods it serves.
pub(crate) fn cors_layer(config: &CorsConfig, methods: &[Method]) -> CorsLayer {
    let origin = if config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.allow_origins.iter().filter_map(|o| {
            HeaderValue::from_str(o)
                .inspect_err(|e| tracing::warn!(origin = %o, "Ignoring invalid CORS origin: {}", e))
                .ok()
        }))
    };

    let mut allowed: Vec<Method> = methods.to_vec();
    allowed.push(Method::OPTIONS);

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(allowed)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age))
}
