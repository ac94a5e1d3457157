//! Route definitions for the `/document-categories` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::document_categories;
use crate::state::AppState;

/// Routes mounted at `/document-categories`.
///
/// ```text
/// GET    /                -> index
/// POST   /                -> create
/// GET    /{id}            -> show
/// PUT    /{id}            -> update
/// DELETE /{id}            -> destroy
/// POST   /{id}/restore    -> restore
/// DELETE /{id}/force      -> force_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(document_categories::index).post(document_categories::create),
        )
        .route(
            "/{id}",
            get(document_categories::show)
                .put(document_categories::update)
                .delete(document_categories::destroy),
        )
        .route("/{id}/restore", post(document_categories::restore))
        .route("/{id}/force", delete(document_categories::force_delete))
}
