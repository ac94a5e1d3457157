//! Route definitions for the `/programs` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::programs;
use crate::state::AppState;

/// Routes mounted at `/programs`.
///
/// ```text
/// GET    /                -> index   (?search, is_active, trashed, sort_by, page)
/// POST   /                -> create
/// GET    /{id}            -> show
/// PUT    /{id}            -> update
/// DELETE /{id}            -> destroy
/// POST   /{id}/restore    -> restore
/// DELETE /{id}/force      -> force_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(programs::index).post(programs::create))
        .route(
            "/{id}",
            get(programs::show)
                .put(programs::update)
                .delete(programs::destroy),
        )
        .route("/{id}/restore", post(programs::restore))
        .route("/{id}/force", delete(programs::force_delete))
}
