//! Route definitions for the `/academic-years` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::academic_years;
use crate::state::AppState;

/// Routes mounted at `/academic-years`.
///
/// ```text
/// GET    /                    -> index
/// POST   /                    -> create
/// GET    /{id}                -> show
/// PUT    /{id}                -> update
/// DELETE /{id}                -> destroy
/// POST   /{id}/set-current    -> set_current
/// POST   /{id}/restore        -> restore
/// DELETE /{id}/force          -> force_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(academic_years::index).post(academic_years::create))
        .route(
            "/{id}",
            get(academic_years::show)
                .put(academic_years::update)
                .delete(academic_years::destroy),
        )
        .route("/{id}/set-current", post(academic_years::set_current))
        .route("/{id}/restore", post(academic_years::restore))
        .route("/{id}/force", delete(academic_years::force_delete))
}
