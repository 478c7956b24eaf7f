use axum::Router;
use axum::http::Method;
use axum::routing::{MethodRouter, get, post};

use crate::config::AppConfig;
use crate::handlers;
use crate::handlers::fallback::{method_not_allowed, options_response};
use crate::state::AppState;

use super::cors_layer;

const AUTH_METHODS: &[Method] = &[Method::POST];
const SONG_METHODS: &[Method] = &[Method::GET, Method::POST];
const CRUD_METHODS: &[Method] = &[Method::GET, Method::POST, Method::PUT, Method::DELETE];

pub fn routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/auth",
            endpoint(post(handlers::auth::login), AUTH_METHODS, config),
        )
        .route(
            "/songs",
            endpoint(
                get(handlers::song::list_songs).post(handlers::song::upload_song),
                SONG_METHODS,
                config,
            )
            .layer(handlers::song::upload_body_limit(
                config.storage.max_upload_size,
            )),
        )
        .route(
            "/queue",
            endpoint(
                get(handlers::queue::list_queue)
                    .post(handlers::queue::enqueue)
                    .put(handlers::queue::set_status)
                    .delete(handlers::queue::cancel_queue_item),
                CRUD_METHODS,
                config,
            ),
        )
        .route(
            "/tables",
            endpoint(
                get(handlers::table::list_tables)
                    .post(handlers::table::create_table)
                    .put(handlers::table::update_table)
                    .delete(handlers::table::deactivate_table),
                CRUD_METHODS,
                config,
            ),
        )
}

/// Finish a route: bare `OPTIONS`, JSON 405 for other methods, then CORS over all of it.
fn endpoint(
    router: MethodRouter<AppState>,
    methods: &[Method],
    config: &AppConfig,
) -> MethodRouter<AppState> {
    let options = options_response(methods);
    router
        .options(move || {
            let options = options.clone();
            async move { options }
        })
        .fallback(method_not_allowed)
        .layer(cors_layer(&config.server.cors, methods))
}
