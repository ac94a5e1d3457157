//! Route definitions for the `/calls` resource and its nested phases and
//! applications.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{call_applications, call_phases, calls};
use crate::state::AppState;

/// Routes mounted at `/calls`.
///
/// Nested routes name the call segment `{id}` like the top-level ones;
/// their handlers extract `(call_id, id)` by position.
///
/// ```text
/// GET    /                                        -> index
/// POST   /                                        -> create
/// GET    /export                                  -> export (CSV)
/// GET    /{id}                                    -> show
/// PUT    /{id}                                    -> update
/// DELETE /{id}                                    -> destroy
/// POST   /{id}/publish                            -> publish
/// POST   /{id}/unpublish                          -> unpublish
/// POST   /{id}/status                             -> set_status
/// POST   /{id}/restore                            -> restore
/// DELETE /{id}/force                              -> force_delete
///
/// GET    /{id}/phases                             -> phases::index
/// POST   /{id}/phases                             -> phases::create
/// GET    /{id}/phases/{child_id}                  -> phases::show
/// PUT    /{id}/phases/{child_id}                  -> phases::update
/// DELETE /{id}/phases/{child_id}                  -> phases::destroy
/// POST   /{id}/phases/{child_id}/mark-current     -> phases::mark_current
/// POST   /{id}/phases/{child_id}/restore          -> phases::restore
/// DELETE /{id}/phases/{child_id}/force            -> phases::force_delete
///
/// GET    /{id}/applications                       -> applications::index
/// POST   /{id}/applications                       -> applications::create
/// GET    /{id}/applications/{child_id}            -> applications::show
/// PUT    /{id}/applications/{child_id}            -> applications::update
/// DELETE /{id}/applications/{child_id}            -> applications::destroy
/// POST   /{id}/applications/{child_id}/status     -> applications::set_status
/// POST   /{id}/applications/{child_id}/restore    -> applications::restore
/// DELETE /{id}/applications/{child_id}/force      -> applications::force_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(calls::index).post(calls::create))
        .route("/export", get(calls::export))
        .route(
            "/{id}",
            get(calls::show).put(calls::update).delete(calls::destroy),
        )
        .route("/{id}/publish", post(calls::publish))
        .route("/{id}/unpublish", post(calls::unpublish))
        .route("/{id}/status", post(calls::set_status))
        .route("/{id}/restore", post(calls::restore))
        .route("/{id}/force", delete(calls::force_delete))
        // Phases
        .route(
            "/{id}/phases",
            get(call_phases::index).post(call_phases::create),
        )
        .route(
            "/{id}/phases/{child_id}",
            get(call_phases::show)
                .put(call_phases::update)
                .delete(call_phases::destroy),
        )
        .route(
            "/{id}/phases/{child_id}/mark-current",
            post(call_phases::mark_current),
        )
        .route("/{id}/phases/{child_id}/restore", post(call_phases::restore))
        .route(
            "/{id}/phases/{child_id}/force",
            delete(call_phases::force_delete),
        )
        // Applications
        .route(
            "/{id}/applications",
            get(call_applications::index).post(call_applications::create),
        )
        .route(
            "/{id}/applications/{child_id}",
            get(call_applications::show)
                .put(call_applications::update)
                .delete(call_applications::destroy),
        )
        .route(
            "/{id}/applications/{child_id}/status",
            post(call_applications::set_status),
        )
        .route(
            "/{id}/applications/{child_id}/restore",
            post(call_applications::restore),
        )
        .route(
            "/{id}/applications/{child_id}/force",
            delete(call_applications::force_delete),
        )
}
