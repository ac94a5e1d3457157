//! Route definitions for the `/translations` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::translations;
use crate::state::AppState;

/// Routes mounted at `/translations`.
///
/// ```text
/// GET    /                                                        -> index
/// POST   /                                                        -> create
/// PUT    /upsert                                                  -> upsert
/// GET    /target/{translatable_type}/{translatable_id}/{locale}   -> for_target
/// GET    /{id}                                                    -> show
/// PUT    /{id}                                                    -> update
/// DELETE /{id}                                                    -> destroy
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(translations::index).post(translations::create))
        .route("/upsert", put(translations::upsert))
        .route(
            "/target/{translatable_type}/{translatable_id}/{locale}",
            get(translations::for_target),
        )
        .route(
            "/{id}",
            get(translations::show)
                .put(translations::update)
                .delete(translations::destroy),
        )
}
