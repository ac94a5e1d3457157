//! Route definitions for the `/resolutions` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::resolutions;
use crate::state::AppState;

/// Routes mounted at `/resolutions`.
///
/// ```text
/// GET    /                  -> index
/// POST   /                  -> create
/// GET    /export            -> export (CSV)
/// GET    /{id}              -> show
/// PUT    /{id}              -> update
/// DELETE /{id}              -> destroy
/// POST   /{id}/publish      -> publish
/// POST   /{id}/unpublish    -> unpublish
/// POST   /{id}/restore      -> restore
/// DELETE /{id}/force        -> force_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(resolutions::index).post(resolutions::create))
        .route("/export", get(resolutions::export))
        .route(
            "/{id}",
            get(resolutions::show)
                .put(resolutions::update)
                .delete(resolutions::destroy),
        )
        .route("/{id}/publish", post(resolutions::publish))
        .route("/{id}/unpublish", post(resolutions::unpublish))
        .route("/{id}/restore", post(resolutions::restore))
        .route("/{id}/force", delete(resolutions::force_delete))
}
