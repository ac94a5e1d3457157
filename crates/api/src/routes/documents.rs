//! Route definitions for the `/documents` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /                  -> index
/// POST   /                  -> create
/// GET    /export            -> export (CSV)
/// GET    /{id}              -> show
/// PUT    /{id}              -> update
/// DELETE /{id}              -> destroy
/// POST   /{id}/download     -> register_download
/// POST   /{id}/restore      -> restore
/// DELETE /{id}/force        -> force_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::index).post(documents::create))
        .route("/export", get(documents::export))
        .route(
            "/{id}",
            get(documents::show)
                .put(documents::update)
                .delete(documents::destroy),
        )
        .route("/{id}/download", post(documents::register_download))
        .route("/{id}/restore", post(documents::restore))
        .route("/{id}/force", delete(documents::force_delete))
}
