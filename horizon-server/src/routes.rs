//! Router assembly.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    handlers::{check, images},
    middleware::{gate_middleware, require_access},
    state::AppState,
};

/// Build the full application router.
///
/// Protected routes sit behind two layers: the outer gate computes a
/// per-request access decision, the inner layer enforces it before the
/// handler runs.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/search", get(images::search_images_handler))
        .route("/least-used", get(images::least_used_images_handler))
        .route(
            "/increase-usage/{*thumb_path}",
            post(images::increase_usage_handler),
        )
        .route(
            "/{family}/{group}/{subgroup}/",
            get(images::images_by_taxonomy_handler),
        )
        .route(
            "/{family}/{group}/{subgroup}/{number}",
            get(images::image_by_number_handler),
        )
        .route_layer(middleware::from_fn(require_access))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate_middleware,
        ));

    Router::new()
        .route("/check", post(check::check_handler))
        .merge(protected)
        .nest_service(
            "/static/images",
            ServeDir::new(&state.config.media.static_root),
        )
        .with_state(state)
}
