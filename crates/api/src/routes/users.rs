//! Route definitions for the `/users` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
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
        .route("/", get(users::index).post(users::create))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/{id}/restore", post(users::restore))
        .route("/{id}/force", delete(users::force_delete))
}
