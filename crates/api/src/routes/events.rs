//! Route definitions for the `/events` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
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
        .route("/", get(events::index).post(events::create))
        .route(
            "/{id}",
            get(events::show).put(events::update).delete(events::destroy),
        )
        .route("/{id}/restore", post(events::restore))
        .route("/{id}/force", delete(events::force_delete))
}
