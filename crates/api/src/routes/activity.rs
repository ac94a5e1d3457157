//! Route definitions for the `/activity-log` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// Routes mounted at `/activity-log`.
///
/// ```text
/// GET    /                                      -> index
/// GET    /export                                -> export (CSV)
/// GET    /subject/{subject_type}/{subject_id}   -> for_subject
/// GET    /{id}                                  -> show
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(activity::index))
        .route("/export", get(activity::export))
        .route(
            "/subject/{subject_type}/{subject_id}",
            get(activity::for_subject),
        )
        .route("/{id}", get(activity::show))
}
