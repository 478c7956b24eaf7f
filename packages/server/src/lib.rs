pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use axum::{Json, Router, routing::get};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::StorageBackend;
use crate::state::AppState;

/// Path under which the filesystem blob store is served.
pub const MEDIA_ROUTE: &str = "/media";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Karaoke Bar API",
        version = "1.0.0",
        description = "Table sessions, song catalog and singing queue for a karaoke bar"
    ),
    paths(
        handlers::auth::login,
        handlers::song::list_songs,
        handlers::song::upload_song,
        handlers::queue::list_queue,
        handlers::queue::enqueue,
        handlers::queue::set_status,
        handlers::queue::cancel_queue_item,
        handlers::table::list_tables,
        handlers::table::create_table,
        handlers::table::update_table,
        handlers::table::deactivate_table,
    ),
    tags(
        (name = "Auth", description = "Admin and table login"),
        (name = "Songs", description = "Song catalog and uploads"),
        (name = "Queue", description = "Per-table singing queue"),
        (name = "Tables", description = "Table session administration"),
    ),
)]
pub struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let media_dir = (state.config.storage.backend == StorageBackend::Filesystem)
        .then(|| state.config.storage.filesystem.path.clone());

    let mut router = Router::new()
        .nest("/api", routes::api_routes(&state.config))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .with_state(state);

    if let Some(dir) = media_dir {
        router = router.nest_service(MEDIA_ROUTE, ServeDir::new(dir));
    }

    router
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .fallback(handlers::fallback::not_found)
}
